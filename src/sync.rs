//! Progress cursor and auto-centring.
//!
//! Converts played fractions into cursor positions, suppressing updates
//! smaller than one device pixel, and keeps the cursor in view when the
//! waveform scrolls inside its container.

use crate::config::WaveConfig;
use crate::viewport::Viewport;

/// A cursor move, with the new scroll offset if the viewport moved too.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    /// Cursor position in CSS pixels.
    pub position: f64,
    pub scroll: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SyncController {
    pixel_ratio: f64,
    scroll_parent: bool,
    auto_center: bool,
    auto_center_rate: f64,
    auto_center_immediately: bool,
    last_position: f64,
    viewport: Viewport,
}

impl SyncController {
    pub fn from_config(config: &WaveConfig) -> Self {
        Self {
            pixel_ratio: config.pixel_ratio,
            scroll_parent: config.scroll_parent,
            auto_center: config.auto_center,
            auto_center_rate: config.auto_center_rate,
            auto_center_immediately: config.auto_center_immediately,
            last_position: 0.0,
            viewport: Viewport::default(),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn last_position(&self) -> f64 {
        self.last_position
    }

    pub fn scroll_parent(&self) -> bool {
        self.scroll_parent
    }

    /// Toggle scrolling; returns the previous value.
    pub fn set_scroll_parent(&mut self, scroll_parent: bool) -> bool {
        std::mem::replace(&mut self.scroll_parent, scroll_parent)
    }

    pub fn reset(&mut self) {
        self.last_position = 0.0;
    }

    /// Move the cursor to `played` of a waveform `width` device pixels wide.
    ///
    /// Returns `None` when the cursor would move forward by less than one
    /// device pixel.
    pub fn progress(&mut self, played: f64, width: u32) -> Option<ProgressUpdate> {
        let quantum = 1.0 / self.pixel_ratio;
        let position = (played * width as f64).round() * quantum;

        if !(position < self.last_position || position - self.last_position >= quantum) {
            return None;
        }
        self.last_position = position;

        let scroll = if self.scroll_parent && self.auto_center {
            let target = (self.viewport.scroll_width * played).floor();
            self.recenter_on_position(target, self.auto_center_immediately)
        } else {
            None
        };
        Some(ProgressUpdate { position, scroll })
    }

    /// Snap the viewport so `percent` of the content is centred.
    pub fn recenter(&mut self, percent: f64) -> Option<f64> {
        let target = self.viewport.scroll_width * percent;
        self.recenter_on_position(target, true)
    }

    /// Scroll towards centring `position` (CSS pixels). While the position
    /// is already visible the move is rate limited unless `immediate`.
    ///
    /// Returns the new scroll offset if it changed.
    pub fn recenter_on_position(&mut self, position: f64, immediate: bool) -> Option<f64> {
        let scroll_left = self.viewport.scroll_left;
        let half = (self.viewport.client_width / 2.0).floor();
        let max_scroll = self.viewport.scroll_width - self.viewport.client_width;
        if max_scroll <= 0.0 {
            return None;
        }

        let mut target = position - half;
        let offset = target - scroll_left;
        if !immediate && -half <= offset && offset < half {
            let rate = self.auto_center_rate / half * max_scroll;
            target = scroll_left + offset.clamp(-rate, rate);
        }

        let target = target.clamp(0.0, max_scroll);
        if target == scroll_left {
            return None;
        }
        self.viewport.scroll_left = target;
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(pixel_ratio: f64) -> SyncController {
        SyncController::from_config(&WaveConfig {
            pixel_ratio,
            scroll_parent: true,
            ..Default::default()
        })
    }

    fn scrolling(controller: &mut SyncController) {
        let viewport = controller.viewport_mut();
        viewport.set_client_width(100.0);
        viewport.set_scroll_width(1000.0);
    }

    #[test]
    fn test_progress_is_quantised() {
        let mut sync = controller(2.0);
        assert!(sync.progress(0.0, 1000).is_none());

        let update = sync.progress(0.001, 1000).unwrap();
        assert_eq!(update.position, 0.5);
        assert!(sync.progress(0.0012, 1000).is_none(), "sub-pixel move");
        assert_eq!(sync.progress(0.002, 1000).unwrap().position, 1.0);

        // Moving backwards always updates.
        assert_eq!(sync.progress(0.001, 1000).unwrap().position, 0.5);
    }

    #[test]
    fn test_recenter_snaps_when_immediate() {
        let mut sync = controller(1.0);
        scrolling(&mut sync);
        assert_eq!(sync.recenter_on_position(500.0, true), Some(450.0));
        assert_eq!(sync.recenter_on_position(500.0, true), None);
        assert_eq!(sync.recenter_on_position(5000.0, true), Some(900.0));
    }

    #[test]
    fn test_recenter_is_rate_limited_when_visible() {
        let mut sync = controller(1.0);
        scrolling(&mut sync);
        // Cursor at 80 is visible; centring needs +30 but the rate is
        // 5 / 50 * 900 = 90, so the full move happens.
        assert_eq!(sync.recenter_on_position(80.0, false), Some(30.0));

        let mut sync = SyncController::from_config(&WaveConfig {
            auto_center_rate: 0.5,
            ..Default::default()
        });
        scrolling(&mut sync);
        // rate = 0.5 / 50 * 900 = 9
        assert_eq!(sync.recenter_on_position(80.0, false), Some(9.0));
    }

    #[test]
    fn test_recenter_snaps_when_cursor_out_of_view() {
        let mut sync = SyncController::from_config(&WaveConfig {
            auto_center_rate: 0.5,
            scroll_parent: true,
            ..Default::default()
        });
        scrolling(&mut sync);
        // 800 is far outside the 100 px window, so no rate limit applies.
        assert_eq!(sync.recenter_on_position(800.0, false), Some(750.0));
    }

    #[test]
    fn test_no_scroll_without_overflow() {
        let mut sync = controller(1.0);
        sync.viewport_mut().set_client_width(100.0);
        assert_eq!(sync.recenter_on_position(80.0, true), None);
    }

    #[test]
    fn test_progress_drives_auto_center() {
        let mut sync = controller(1.0);
        scrolling(&mut sync);
        let update = sync.progress(0.5, 1000).unwrap();
        assert_eq!(update.position, 500.0);
        assert!(update.scroll.is_some());

        sync.set_scroll_parent(false);
        assert_eq!(sync.progress(0.9, 1000).unwrap().scroll, None);
    }
}
