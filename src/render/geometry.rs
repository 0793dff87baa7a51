//! Device-pixel geometry shared by the painter and the rasteriser.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Empty, inverted or non-finite rectangles draw nothing.
    pub fn is_degenerate(&self) -> bool {
        !(self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// How logical waveform coordinates land on a surface.
///
/// Waveform code always draws left to right along x. A vertical view swaps
/// the axes once, when commands are recorded on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn from_vertical(vertical: bool) -> Self {
        if vertical {
            Orientation::Vertical
        } else {
            Orientation::Horizontal
        }
    }

    pub fn map_point(self, p: Point) -> Point {
        match self {
            Orientation::Horizontal => p,
            Orientation::Vertical => Point::new(p.y, p.x),
        }
    }

    pub fn map_rect(self, r: Rect) -> Rect {
        match self {
            Orientation::Horizontal => r,
            Orientation::Vertical => Rect::new(r.y, r.x, r.height, r.width),
        }
    }

    /// Surface dimensions for a logical `(width, height)`.
    pub fn map_size(self, width: u32, height: u32) -> (u32, u32) {
        match self {
            Orientation::Horizontal => (width, height),
            Orientation::Vertical => (height, width),
        }
    }
}
