//! Global-to-tile drawing.
//!
//! Callers draw in device pixels across the whole waveform; the painter
//! splits each primitive over the tiles it touches and records it on both
//! the wave and progress layers.

use crate::config::{ColorScheme, Palette};

use super::allocator::TileSet;
use super::geometry::{Point, Rect};
use super::tile::{DrawCommand, Tile};

pub struct TilePainter<'a> {
    tiles: &'a mut TileSet,
    colors: &'a ColorScheme,
}

impl<'a> TilePainter<'a> {
    pub fn new(tiles: &'a mut TileSet, colors: &'a ColorScheme) -> Self {
        Self { tiles, colors }
    }

    /// Total width in device pixels.
    pub fn width(&self) -> u32 {
        self.tiles.width()
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.tiles.pixel_ratio()
    }

    /// Fill a rectangle given in global device pixels.
    ///
    /// Returns the number of tiles that received a piece of it.
    pub fn fill_region(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        radius: f64,
        channel: usize,
    ) -> usize {
        let region = Rect::new(x, y, width, height);
        if region.is_degenerate() || self.tiles.is_empty() {
            return 0;
        }

        let cap = self.tiles.max_canvas_width() as f64;
        let count = self.tiles.len();
        // The last tile may run past `cap * count`.
        let start = ((x / cap).floor().max(0.0) as usize).min(count - 1);
        let end = (((region.right() / cap).ceil() + 1.0).max(0.0) as usize).min(count);

        let orientation = self.tiles.orientation();
        let palette = self.colors.for_channel(channel);
        let mut touched = 0;

        for tile in self.tiles.tiles_mut()[start.min(end)..end].iter_mut() {
            let left = tile.offset as f64;
            let x1 = region.x.max(left);
            let x2 = region.right().min(left + tile.width as f64);
            if x2 <= x1 {
                continue;
            }
            let local = orientation.map_rect(Rect::new(x1 - left, y, x2 - x1, height));
            record(tile, palette, |color| DrawCommand::FillRect {
                rect: local,
                radius,
                color,
            });
            touched += 1;
        }
        touched
    }

    /// Fill the closed polygon through `points` (global device pixels).
    ///
    /// Each tile receives the points inside its span plus their immediate
    /// neighbours, so a path crossing a seam is continuous on both sides.
    pub fn draw_polyline(&mut self, points: &[Point], channel: usize) -> usize {
        if points.len() < 2 || points.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return 0;
        }

        let orientation = self.tiles.orientation();
        let palette = self.colors.for_channel(channel);
        let mut touched = 0;

        for tile in self.tiles.tiles_mut().iter_mut() {
            let left = tile.offset as f64;
            let right = left + tile.width as f64;
            let overlaps = |a: &Point, b: &Point| a.x.min(b.x) <= right && a.x.max(b.x) >= left;

            let local: Vec<Point> = points
                .iter()
                .enumerate()
                .filter(|(j, p)| {
                    let prev = j.checked_sub(1).and_then(|k| points.get(k));
                    let next = points.get(j + 1);
                    prev.map_or(false, |q| overlaps(q, p)) || next.map_or(false, |q| overlaps(p, q))
                })
                .map(|(_, p)| orientation.map_point(Point::new(p.x - left, p.y)))
                .collect();

            if local.len() < 2 {
                continue;
            }
            record(tile, palette, |color| DrawCommand::Path {
                points: local.clone(),
                color,
            });
            touched += 1;
        }
        touched
    }
}

fn record(tile: &mut Tile, palette: Palette, command: impl Fn(image::Rgba<u8>) -> DrawCommand) {
    tile.wave.push(command(palette.wave));
    if let Some(progress) = &mut tile.progress {
        progress.push(command(palette.progress));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaveConfig;
    use crate::render::geometry::Orientation;

    fn setup(width: u32) -> (TileSet, ColorScheme) {
        let config = WaveConfig {
            max_canvas_width: 100,
            ..Default::default()
        };
        let mut tiles = TileSet::from_config(&config).unwrap();
        tiles.resize(width, 20);
        (tiles, config.color_scheme().unwrap())
    }

    fn rects(tile: &Tile) -> Vec<Rect> {
        tile.wave
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::FillRect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_fill_inside_single_tile() {
        let (mut tiles, colors) = setup(250);
        let n = tiles.painter(&colors).fill_region(10.0, 2.0, 5.0, 4.0, 0.0, 0);
        assert_eq!(n, 1);
        assert_eq!(rects(&tiles.tiles()[0]), vec![Rect::new(10.0, 2.0, 5.0, 4.0)]);
        assert_eq!(tiles.tiles()[0].progress.as_ref().unwrap().commands().len(), 1);
    }

    #[test]
    fn test_region_in_wide_last_tile() {
        let (mut tiles, colors) = setup(204);
        assert_eq!(tiles.len(), 2);
        assert_eq!(tiles.tiles()[1].width, 104);

        let n = tiles.painter(&colors).fill_region(200.0, 0.0, 4.0, 10.0, 0.0, 0);
        assert_eq!(n, 1, "Pixels past the last full tile must still be drawn");
        assert_eq!(rects(&tiles.tiles()[1]), vec![Rect::new(100.0, 0.0, 4.0, 10.0)]);
    }

    #[test]
    fn test_fill_is_split_at_seam() {
        let (mut tiles, colors) = setup(250);
        tiles.painter(&colors).fill_region(90.0, 0.0, 20.0, 4.0, 0.0, 0);

        // Tile 0 spans [0, 102) thanks to the overlap.
        assert_eq!(rects(&tiles.tiles()[0]), vec![Rect::new(90.0, 0.0, 12.0, 4.0)]);
        assert_eq!(rects(&tiles.tiles()[1]), vec![Rect::new(0.0, 0.0, 10.0, 4.0)]);
        assert!(tiles.tiles()[2].is_blank());
    }

    #[test]
    fn test_degenerate_fill_is_noop() {
        let (mut tiles, colors) = setup(250);
        let mut painter = tiles.painter(&colors);
        assert_eq!(painter.fill_region(10.0, 0.0, 0.0, 4.0, 0.0, 0), 0);
        assert_eq!(painter.fill_region(10.0, 0.0, 4.0, -1.0, 0.0, 0), 0);
        assert_eq!(painter.fill_region(f64::INFINITY, 0.0, 4.0, 4.0, 0.0, 0), 0);
        assert_eq!(painter.fill_region(-50.0, 0.0, 10.0, 4.0, 0.0, 0), 0);
    }

    #[test]
    fn test_polyline_duplicates_boundary_points() {
        let (mut tiles, colors) = setup(250);
        let points: Vec<Point> = (0..=5).map(|i| Point::new(i as f64 * 50.0, 5.0)).collect();
        let n = tiles.painter(&colors).draw_polyline(&points, 0);
        assert_eq!(n, 3);

        let xs = |tile: &Tile| match &tile.wave.commands()[0] {
            DrawCommand::Path { points, .. } => points.iter().map(|p| p.x).collect::<Vec<_>>(),
            _ => panic!("expected a path"),
        };
        // Tile 1 covers [100, 202]: the points at 100, 150, 200 and neighbours 50, 250.
        assert_eq!(xs(&tiles.tiles()[1]), vec![-50.0, 0.0, 50.0, 100.0, 150.0]);
        assert_eq!(xs(&tiles.tiles()[2]), vec![-50.0, 0.0, 50.0]);
    }

    #[test]
    fn test_vertical_fill_is_transposed() {
        let mut tiles = TileSet::new(100, 1.0, Orientation::Vertical, false);
        tiles.resize(50, 20);
        let colors = WaveConfig::default().color_scheme().unwrap();
        tiles.painter(&colors).fill_region(10.0, 2.0, 5.0, 4.0, 0.0, 0);
        assert_eq!(rects(&tiles.tiles()[0]), vec![Rect::new(2.0, 10.0, 4.0, 5.0)]);
    }
}
