use image::Rgba;

use super::geometry::{Point, Rect};

/// A recorded drawing operation in tile-local surface pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        rect: Rect,
        radius: f64,
        color: Rgba<u8>,
    },
    /// Closed, filled polygon.
    Path { points: Vec<Point>, color: Rgba<u8> },
}

/// One drawing surface of a tile.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layer {
    pub width: u32,
    pub height: u32,
    commands: Vec<DrawCommand>,
}

impl Layer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

/// A bounded-width slice of the waveform.
///
/// `width`, `nominal_width` and `height` are logical device pixels (before
/// any vertical axis swap); the layers carry the swapped surface size.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub index: usize,
    /// Left edge in device pixels.
    pub offset: u32,
    /// Left edge in CSS pixels.
    pub element_offset: u32,
    /// Surface width, including the seam overlap on all but the last tile.
    pub width: u32,
    /// Span this tile is responsible for, without overlap.
    pub nominal_width: u32,
    pub height: u32,
    /// Fraction of the total width where the tile starts.
    pub start: f64,
    /// Fraction of the total width where the tile ends.
    pub end: f64,
    pub wave: Layer,
    pub progress: Option<Layer>,
}

impl Tile {
    pub fn clear(&mut self) {
        self.wave.clear();
        if let Some(progress) = &mut self.progress {
            progress.clear();
        }
    }

    pub fn is_blank(&self) -> bool {
        self.wave.commands().is_empty()
            && self.progress.as_ref().map_or(true, |p| p.commands().is_empty())
    }
}
