//! Bar and continuous waveform drawing on top of [`TilePainter`].

use crate::config::{BarStyle, DrawMode, WaveConfig};
use crate::peaks::Envelope;

use super::geometry::Point;
use super::painter::TilePainter;

/// Turns an envelope into fills and paths for one channel row.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformRenderer {
    mode: DrawMode,
    pixel_ratio: f64,
    /// Row height in device pixels.
    height: f64,
    bar_height: f64,
    normalize: bool,
}

impl WaveformRenderer {
    pub fn from_config(config: &WaveConfig) -> Self {
        Self {
            mode: config.draw_mode(),
            pixel_ratio: config.pixel_ratio,
            height: config.height as f64 * config.pixel_ratio,
            bar_height: config.bar_height,
            normalize: config.normalize,
        }
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    fn half_pixel(&self) -> f64 {
        0.5 / self.pixel_ratio
    }

    /// Value that maps to a full half-row.
    pub fn absmax(&self, peaks: &Envelope) -> f64 {
        let fixed = if self.bar_height > 0.0 {
            1.0 / self.bar_height
        } else {
            1.0
        };
        if self.normalize {
            let max = peaks.abs_max() as f64;
            if max > 0.0 {
                return max;
            }
        }
        fixed
    }

    /// Bar width, gap and step in device pixels.
    pub fn bar_metrics(&self, style: &BarStyle) -> (f64, f64, f64) {
        let pr = self.pixel_ratio;
        let bar = style.width * pr;
        let gap = match style.gap {
            Some(gap) => pr.max(gap * pr),
            None => pr.max((bar / 2.0).floor()),
        };
        (bar, gap, bar + gap)
    }

    /// Draw `peaks` for `channel_index` over device columns `range`.
    ///
    /// `None` draws the idle state: nothing for bars, the baseline for a
    /// continuous wave.
    pub fn draw_peaks(
        &self,
        painter: &mut TilePainter<'_>,
        peaks: &Envelope,
        channel_index: usize,
        range: Option<(u32, u32)>,
    ) {
        match self.mode {
            DrawMode::Bars(style) => {
                if let Some((start, end)) = range {
                    self.draw_bars(painter, &style, peaks, channel_index, start, end);
                }
            }
            DrawMode::Continuous => self.draw_wave(painter, peaks, channel_index, range),
        }
    }

    fn draw_bars(
        &self,
        painter: &mut TilePainter<'_>,
        style: &BarStyle,
        peaks: &Envelope,
        channel_index: usize,
        start: u32,
        end: u32,
    ) {
        let total_width = painter.width() as f64;
        if peaks.is_empty() || total_width <= 0.0 {
            return;
        }
        let (bar, _, step) = self.bar_metrics(style);
        let half_h = self.height / 2.0;
        let offset_y = self.height * channel_index as f64;
        let absmax = self.absmax(peaks);
        let scale = peaks.len() as f64 / total_width;
        let half_pixel = self.half_pixel();
        let radius = style.radius * self.pixel_ratio;

        let mut x = start as f64;
        while x < end as f64 {
            let first = (x * scale).floor() as usize;
            let last = (((x + step) * scale).floor() as usize).max(first + 1);
            let peak = peaks.as_slice()[first.min(peaks.len())..last.min(peaks.len())]
                .iter()
                .map(|p| p.magnitude())
                .fold(0.0f32, f32::max) as f64;

            let mut h = (peak / absmax * half_h).round();
            if let Some(min_height) = style.min_height {
                h = h.max(min_height);
            }
            painter.fill_region(
                x + half_pixel,
                half_h - h + offset_y,
                bar + half_pixel,
                h * 2.0,
                radius,
                channel_index,
            );
            x += step;
        }
    }

    fn draw_wave(
        &self,
        painter: &mut TilePainter<'_>,
        peaks: &Envelope,
        channel_index: usize,
        range: Option<(u32, u32)>,
    ) {
        let total_width = painter.width() as f64;
        let half_h = self.height / 2.0;
        let offset_y = self.height * channel_index as f64;

        if let Some((start, end)) = range {
            let mirrored;
            let peaks = if peaks.has_negative_min() {
                peaks
            } else {
                mirrored = peaks.mirrored();
                &mirrored
            };
            let outline = self.outline(peaks, total_width, half_h + offset_y, start, end);
            painter.draw_polyline(&outline, channel_index);
        }

        painter.fill_region(0.0, half_h + offset_y - 0.5, total_width, 1.0, 0.0, channel_index);
    }

    /// Closed outline: maxima left to right, then minima right to left.
    fn outline(
        &self,
        peaks: &Envelope,
        total_width: f64,
        baseline: f64,
        start: u32,
        end: u32,
    ) -> Vec<Point> {
        let len = peaks.len();
        if len == 0 || total_width <= 0.0 {
            return Vec::new();
        }
        let column_width = total_width / (len.saturating_sub(1).max(1)) as f64;
        let per_px = len as f64 / total_width;
        let first = ((start as f64 * per_px).floor() as usize).min(len - 1);
        let last = ((end as f64 * per_px).ceil() as usize).clamp(first + 1, len);

        let half_h = self.height / 2.0;
        let unit = half_h / self.absmax(peaks);
        let half_pixel = self.half_pixel();
        let x_of = |i: usize| i as f64 * column_width + half_pixel;
        let y_of = |v: f32| baseline - (v as f64 * unit).round();
        let slice = &peaks.as_slice()[first..last];

        let mut points = Vec::with_capacity(slice.len() * 2 + 2);
        points.push(Point::new(first as f64 * column_width, baseline));
        points.extend(
            slice
                .iter()
                .enumerate()
                .map(|(k, p)| Point::new(x_of(first + k), y_of(p.max))),
        );
        points.extend(
            slice
                .iter()
                .enumerate()
                .rev()
                .map(|(k, p)| Point::new(x_of(first + k), y_of(p.min))),
        );
        points.push(Point::new(first as f64 * column_width, baseline));
        points
    }
}
