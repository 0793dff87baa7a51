//! Mirrors a [`TileSet`] as one GPU texture per tile.

use crate::render::raster::composite_tile;
use crate::render::TileSet;

use super::{GpuContext, GpuError, TileTexture};

/// GPU textures kept in step with a [`TileSet`].
///
/// Textures are created when the tile count grows, dropped from the tail
/// when it shrinks and recreated only when a tile's surface size changes.
#[derive(Default)]
pub struct TileTextures {
    textures: Vec<TileTexture>,
}

impl TileTextures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn textures(&self) -> &[TileTexture] {
        &self.textures
    }

    /// Rasterise every tile with `progress` (fraction of the total width)
    /// revealed and upload it.
    pub fn sync(&mut self, ctx: &GpuContext, tiles: &TileSet, progress: f64) -> Result<(), GpuError> {
        let limit = ctx.max_texture_dimension();
        for tile in tiles.tiles() {
            let (w, h) = (tile.wave.width, tile.wave.height);
            if w == 0 || h == 0 {
                return Err(GpuError::EmptyTile(tile.index));
            }
            if w > limit || h > limit {
                return Err(GpuError::TileTooWide {
                    index: tile.index,
                    width: w.max(h),
                    limit,
                });
            }
        }

        if self.textures.len() > tiles.len() {
            log::debug!("Releasing {} tile texture(s)", self.textures.len() - tiles.len());
            self.textures.truncate(tiles.len());
        }

        let progress_px = progress.clamp(0.0, 1.0) * tiles.width() as f64;
        for tile in tiles.tiles() {
            let size = (tile.wave.width, tile.wave.height);
            let label = format!("tile_{}", tile.index);
            let current = self.textures.get(tile.index).map(TileTexture::size);
            if current != Some(size) {
                let texture = TileTexture::new(&ctx.device, &label, size.0, size.1);
                if current.is_some() {
                    self.textures[tile.index] = texture;
                } else {
                    self.textures.push(texture);
                }
            }

            let image = composite_tile(tile, tiles.orientation(), progress_px - tile.offset as f64);
            self.textures[tile.index].upload(&ctx.queue, &image);
        }
        Ok(())
    }

    pub fn release(&mut self) {
        self.textures.clear();
    }
}
