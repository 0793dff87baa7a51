//! CPU rasterisation of recorded tile layers.
//!
//! Rectangles get analytic per-axis coverage, paths use an even-odd
//! scanline fill sampled at pixel centres. The composite stitches tiles at
//! their offsets and reveals the progress layer up to the cursor.

use image::{imageops, Rgba, RgbaImage};

use super::allocator::TileSet;
use super::geometry::{Orientation, Point, Rect};
use super::tile::{DrawCommand, Layer, Tile};

/// Options for [`composite`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositeOptions {
    /// Played fraction in `[0, 1]`.
    pub progress: f64,
    pub background: Option<Rgba<u8>>,
    /// Cursor colour and width in device pixels.
    pub cursor: Option<(Rgba<u8>, u32)>,
    /// Mirror the result horizontally.
    pub rtl: bool,
}

impl Default for CompositeOptions {
    fn default() -> Self {
        Self {
            progress: 0.0,
            background: None,
            cursor: None,
            rtl: false,
        }
    }
}

pub fn rasterize_layer(layer: &Layer) -> RgbaImage {
    let mut img = RgbaImage::new(layer.width, layer.height);
    for command in layer.commands() {
        match command {
            DrawCommand::FillRect {
                rect,
                radius,
                color,
            } => fill_rect(&mut img, rect, *radius, *color),
            DrawCommand::Path { points, color } => fill_path(&mut img, points, *color),
        }
    }
    img
}

/// Rasterise one tile, showing its progress layer over the first
/// `progress_px` logical pixels.
pub fn composite_tile(tile: &Tile, orientation: Orientation, progress_px: f64) -> RgbaImage {
    let mut img = rasterize_layer(&tile.wave);
    let Some(progress) = &tile.progress else {
        return img;
    };
    let reveal = progress_px.clamp(0.0, tile.width as f64).round() as u32;
    if reveal == 0 {
        return img;
    }

    let played = rasterize_layer(progress);
    let (w, h) = orientation.map_size(reveal, tile.height);
    let w = w.min(played.width());
    let h = h.min(played.height());
    for y in 0..h {
        for x in 0..w {
            img.put_pixel(x, y, *played.get_pixel(x, y));
        }
    }
    img
}

/// Stitch every tile into one image of the whole waveform.
pub fn composite(tiles: &TileSet, options: &CompositeOptions) -> RgbaImage {
    let orientation = tiles.orientation();
    let (width, height) = orientation.map_size(tiles.width(), tiles.height());
    let mut canvas = RgbaImage::from_pixel(
        width,
        height,
        options.background.unwrap_or(Rgba([0, 0, 0, 0])),
    );

    let progress_px = options.progress.clamp(0.0, 1.0) * tiles.width() as f64;
    for tile in tiles.tiles() {
        let img = composite_tile(tile, orientation, progress_px - tile.offset as f64);
        let (x, y) = match orientation {
            Orientation::Horizontal => (tile.offset as i64, 0),
            Orientation::Vertical => (0, tile.offset as i64),
        };
        imageops::overlay(&mut canvas, &img, x, y);
    }

    if let Some((color, cursor_width)) = options.cursor {
        if cursor_width > 0 && tiles.width() > 0 {
            let x = progress_px
                .round()
                .min((tiles.width() - cursor_width.min(tiles.width())) as f64);
            let bar = orientation.map_rect(Rect::new(
                x,
                0.0,
                cursor_width as f64,
                tiles.height() as f64,
            ));
            fill_rect(&mut canvas, &bar, 0.0, color);
        }
    }

    if options.rtl {
        imageops::flip_horizontal_in_place(&mut canvas);
    }
    canvas
}

fn blend(img: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>, coverage: f64) {
    let alpha = color[3] as f64 / 255.0 * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = img.get_pixel_mut(x, y);
    let dst_alpha = dst[3] as f64 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    for c in 0..3 {
        let src = color[c] as f64 * alpha;
        let below = dst[c] as f64 * dst_alpha * (1.0 - alpha);
        dst[c] = ((src + below) / out_alpha).round().clamp(0.0, 255.0) as u8;
    }
    dst[3] = (out_alpha * 255.0).round() as u8;
}

/// Fraction of pixel `[p, p + 1)` covered by `[a, b)`.
fn span_coverage(p: u32, a: f64, b: f64) -> f64 {
    let lo = a.max(p as f64);
    let hi = b.min(p as f64 + 1.0);
    (hi - lo).max(0.0)
}

fn fill_rect(img: &mut RgbaImage, rect: &Rect, radius: f64, color: Rgba<u8>) {
    if rect.is_degenerate() {
        return;
    }
    let x0 = rect.x.floor().max(0.0) as u32;
    let y0 = rect.y.floor().max(0.0) as u32;
    let x1 = (rect.right().ceil().max(0.0) as u32).min(img.width());
    let y1 = (rect.bottom().ceil().max(0.0) as u32).min(img.height());
    let r = radius.max(0.0).min(rect.width / 2.0).min(rect.height / 2.0);

    for y in y0..y1 {
        let cy = span_coverage(y, rect.y, rect.bottom());
        for x in x0..x1 {
            if r > 0.0 && !inside_rounded(rect, r, x as f64 + 0.5, y as f64 + 0.5) {
                continue;
            }
            let coverage = cy * span_coverage(x, rect.x, rect.right());
            blend(img, x, y, color, coverage);
        }
    }
}

fn inside_rounded(rect: &Rect, r: f64, cx: f64, cy: f64) -> bool {
    let qx = cx.clamp(rect.x + r, rect.right() - r);
    let qy = cy.clamp(rect.y + r, rect.bottom() - r);
    (cx - qx).powi(2) + (cy - qy).powi(2) <= r * r
}

fn fill_path(img: &mut RgbaImage, points: &[Point], color: Rgba<u8>) {
    if points.len() < 3 {
        return;
    }
    let mut crossings = Vec::new();
    for y in 0..img.height() {
        let yc = y as f64 + 0.5;
        crossings.clear();
        for (i, a) in points.iter().enumerate() {
            let b = &points[(i + 1) % points.len()];
            if (a.y <= yc && yc < b.y) || (b.y <= yc && yc < a.y) {
                crossings.push(a.x + (yc - a.y) * (b.x - a.x) / (b.y - a.y));
            }
        }
        crossings.sort_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let from = (pair[0] - 0.5).ceil().max(0.0) as u32;
            let to = ((pair[1] - 0.5).ceil().max(0.0) as u32).min(img.width());
            for x in from..to {
                blend(img, x, y, color, 1.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_fill_rect_integer_bounds() {
        let mut layer = Layer::new(4, 4);
        layer.push(DrawCommand::FillRect {
            rect: Rect::new(1.0, 1.0, 2.0, 2.0),
            radius: 0.0,
            color: RED,
        });
        let img = rasterize_layer(&layer);
        assert_eq!(*img.get_pixel(1, 1), RED);
        assert_eq!(*img.get_pixel(2, 2), RED);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(3, 3)[3], 0);
    }

    #[test]
    fn test_fill_rect_partial_coverage() {
        let mut layer = Layer::new(3, 1);
        layer.push(DrawCommand::FillRect {
            rect: Rect::new(0.5, 0.0, 1.0, 1.0),
            radius: 0.0,
            color: RED,
        });
        let img = rasterize_layer(&layer);
        assert_eq!(img.get_pixel(0, 0)[3], 128);
        assert_eq!(img.get_pixel(1, 0)[3], 128);
        assert_eq!(img.get_pixel(2, 0)[3], 0);
    }

    #[test]
    fn test_fill_path_triangle() {
        let mut layer = Layer::new(10, 10);
        layer.push(DrawCommand::Path {
            points: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(0.0, 10.0)],
            color: RED,
        });
        let img = rasterize_layer(&layer);
        assert_eq!(*img.get_pixel(1, 1), RED);
        assert_eq!(img.get_pixel(9, 9)[3], 0);
    }

    #[test]
    fn test_rounded_corners_are_cut() {
        let mut layer = Layer::new(10, 10);
        layer.push(DrawCommand::FillRect {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            radius: 5.0,
            color: RED,
        });
        let img = rasterize_layer(&layer);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(*img.get_pixel(5, 5), RED);
    }
}
