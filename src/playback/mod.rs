//! Playback position tracking.
//!
//! A [`PlaybackClock`] runs a small PLAYING / PAUSED / FINISHED state
//! machine against a [`HardwareClock`] it does not control. All position
//! queries are pure functions of the current [`PlaybackState`].

mod clock;
mod context;
mod source;

pub use clock::{Phase, PlaybackClock, PlaybackError, PlaybackState, SeekRange, TickOutcome};
pub use context::{AudioContext, DEFAULT_SAMPLE_RATE, SCRIPT_BUFFER_SIZE};
pub use source::{AudioSource, HardwareClock, ManualClock, SilentSource, SourceError, SystemClock};
