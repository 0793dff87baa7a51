//! Optional GPU back end.
//!
//! Rasterised tiles can be uploaded into wgpu textures so a host renderer
//! can sample them directly. Tile width is validated against the device's
//! `max_texture_dimension_2d`.

pub mod context;
pub mod textures;
pub mod tiles;

pub use context::{GpuContext, GpuError};
pub use textures::{ReadbackBuffer, TileTexture};
pub use tiles::TileTextures;
