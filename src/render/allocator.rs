//! Tile allocation.
//!
//! A single surface cannot be arbitrarily wide, so the waveform is split into
//! tiles of at most `max_canvas_width` device pixels. Each tile but the last
//! is `overlap` pixels wider than its span so anti-aliased edges meet without
//! a visible seam.

use crate::config::{ColorScheme, ConfigError, WaveConfig};

use super::geometry::Orientation;
use super::painter::TilePainter;
use super::tile::{Layer, Tile};

#[derive(Debug, Clone)]
pub struct TileSet {
    max_canvas_width: u32,
    pixel_ratio: f64,
    max_element_width: u32,
    overlap: u32,
    orientation: Orientation,
    has_progress: bool,
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileSet {
    pub fn new(
        max_canvas_width: u32,
        pixel_ratio: f64,
        orientation: Orientation,
        has_progress: bool,
    ) -> Self {
        Self {
            max_canvas_width,
            pixel_ratio,
            max_element_width: (max_canvas_width as f64 / pixel_ratio).round() as u32,
            overlap: 2 * (pixel_ratio / 2.0).ceil() as u32,
            orientation,
            has_progress,
            width: 0,
            height: 0,
            tiles: Vec::new(),
        }
    }

    pub fn from_config(config: &WaveConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(
            config.max_canvas_width,
            config.pixel_ratio,
            Orientation::from_vertical(config.vertical),
            config.color_scheme()?.has_progress(),
        ))
    }

    pub fn max_canvas_width(&self) -> u32 {
        self.max_canvas_width
    }

    /// `max_canvas_width` in CSS pixels.
    pub fn max_element_width(&self) -> u32 {
        self.max_element_width
    }

    pub fn overlap(&self) -> u32 {
        self.overlap
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn has_progress(&self) -> bool {
        self.has_progress
    }

    /// Total width in device pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub(crate) fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Number of tiles needed to cover `total_width` device pixels.
    pub fn required_tiles(&self, total_width: u32) -> usize {
        let css_width = (total_width as f64 / self.pixel_ratio).round();
        (css_width / (self.max_element_width + self.overlap) as f64).ceil() as usize
    }

    /// Lay tiles out over `total_width` x `total_height` device pixels and
    /// clear every surviving tile.
    pub fn resize(&mut self, total_width: u32, total_height: u32) {
        self.width = total_width;
        self.height = total_height;

        let required = self.required_tiles(total_width);
        if required > self.tiles.len() {
            log::debug!("Growing tiles {} -> {}", self.tiles.len(), required);
            while self.tiles.len() < required {
                let tile = self.create_tile(self.tiles.len());
                self.tiles.push(tile);
            }
        } else if required < self.tiles.len() {
            log::debug!("Shrinking tiles {} -> {}", self.tiles.len(), required);
            self.tiles.truncate(required);
        }

        let last = required.saturating_sub(1);
        let total_css = (total_width as f64 / self.pixel_ratio).round();
        for i in 0..self.tiles.len() {
            let (width, nominal_width) = if i == last {
                let width = total_width.saturating_sub(self.max_canvas_width * last as u32);
                (width, width)
            } else {
                (self.max_canvas_width + self.overlap, self.max_canvas_width)
            };
            self.update_tile(i, width, nominal_width, total_css);
        }
    }

    fn create_tile(&self, index: usize) -> Tile {
        Tile {
            index,
            offset: self.max_canvas_width * index as u32,
            element_offset: self.max_element_width * index as u32,
            width: 0,
            nominal_width: 0,
            height: 0,
            start: 0.0,
            end: 0.0,
            wave: Layer::default(),
            progress: self.has_progress.then(Layer::default),
        }
    }

    fn update_tile(&mut self, index: usize, width: u32, nominal_width: u32, total_css: f64) {
        let (surface_w, surface_h) = self.orientation.map_size(width, self.height);
        let element_width = (width as f64 / self.pixel_ratio).round();
        let height = self.height;
        let tile = &mut self.tiles[index];

        tile.width = width;
        tile.nominal_width = nominal_width;
        tile.height = height;
        tile.start = if total_css > 0.0 {
            tile.element_offset as f64 / total_css
        } else {
            0.0
        };
        tile.end = if total_css > 0.0 {
            tile.start + element_width / total_css
        } else {
            0.0
        };
        tile.wave.resize(surface_w, surface_h);
        if let Some(progress) = &mut tile.progress {
            progress.resize(surface_w, surface_h);
        }
        tile.clear();
    }

    /// Wipe every layer without touching the layout.
    pub fn clear(&mut self) {
        for tile in &mut self.tiles {
            tile.clear();
        }
    }

    /// Drop every tile.
    pub fn release(&mut self) {
        self.tiles.clear();
        self.width = 0;
        self.height = 0;
    }

    pub fn painter<'a>(&'a mut self, colors: &'a ColorScheme) -> TilePainter<'a> {
        TilePainter::new(self, colors)
    }
}
