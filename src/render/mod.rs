//! Tiled waveform rendering.
//!
//! - [`TileSet`] lays bounded-width tiles over the full waveform width
//! - [`TilePainter`] maps global draw calls onto tile-local commands
//! - [`WaveformRenderer`] draws bars or a continuous wave from an envelope
//! - [`raster`] turns recorded commands into pixels

pub mod allocator;
pub mod geometry;
pub mod painter;
pub mod raster;
pub mod tile;
pub mod waveform;

pub use allocator::TileSet;
pub use geometry::{Orientation, Point, Rect};
pub use painter::TilePainter;
pub use raster::{composite, rasterize_layer, CompositeOptions};
pub use tile::{DrawCommand, Layer, Tile};
pub use waveform::WaveformRenderer;
