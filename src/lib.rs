//! Tilewave Core
//!
//! Tiled, zoomable audio waveform rendering kept in sync with playback.
//!
//! # Features
//!
//! - Audio loading (WAV, MP3, FLAC, AAC) via Symphonia
//! - Lazily memoised min/max peak envelopes per channel
//! - Bar and continuous waveforms drawn across width-limited tiles
//! - CPU rasterisation to `image` buffers, optional upload to wgpu textures
//! - A PLAYING / PAUSED / FINISHED playback clock with auto-centring cursor
//! - Interval driver on a tokio `LocalSet` (when `tokio` feature is enabled)

pub mod audio;
pub mod config;
#[cfg(feature = "tokio")]
pub mod driver;
pub mod events;
pub mod gpu;
pub mod peaks;
pub mod playback;
pub mod render;
pub mod scheduler;
pub mod sync;
pub mod view;
pub mod viewport;

// Re-export commonly used types
pub use audio::{load_audio, AudioData, AudioError, DecodedAudio, PlanarBuffer};
pub use config::{parse_hex_color, ConfigError, WaveConfig};
#[cfg(feature = "tokio")]
pub use driver::{Driver, TokioClock};
pub use events::{Event, EventBus, EventKind, ListenerId};
pub use gpu::{GpuContext, GpuError, TileTextures};
pub use peaks::{Envelope, Peak, PeakStore};
pub use playback::{
    AudioContext, AudioSource, HardwareClock, PlaybackClock, PlaybackError, PlaybackState,
    TickOutcome,
};
pub use render::{TileSet, TilePainter, WaveformRenderer};
pub use sync::SyncController;
pub use view::{WaveView, WaveViewError};
pub use viewport::{PointerEvent, Viewport};
