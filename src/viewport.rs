//! Scrollable viewport geometry and click normalisation.
//!
//! Bounds and pointer positions are screen coordinates in CSS pixels.
//! Scroll values run along the waveform axis, so they are already
//! oriented for vertical views.

/// A pointer position as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    pub client_x: f64,
    pub client_y: f64,
}

impl PointerEvent {
    pub fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }

    fn oriented(self, vertical: bool) -> Self {
        if vertical {
            Self::new(self.client_y, self.client_x)
        } else {
            self
        }
    }
}

/// Screen rectangle of the scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    fn oriented(self, vertical: bool) -> Self {
        if vertical {
            Self::new(self.top, self.left, self.bottom, self.right)
        } else {
            self
        }
    }
}

/// Layout facts needed to turn a click into a progress fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickLayout {
    pub rtl: bool,
    pub vertical: bool,
    pub fill_parent: bool,
    pub pixel_ratio: f64,
    /// Waveform width in device pixels.
    pub nominal_width: f64,
    /// Container width in device pixels.
    pub parent_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub bounds: Bounds,
    pub scroll_left: f64,
    pub client_width: f64,
    /// Scrollable content width; never below `client_width`.
    pub scroll_width: f64,
    /// Height of a horizontal scrollbar, 0 if none is shown.
    pub scrollbar_height: f64,
}

impl Viewport {
    pub fn new(client_width: f64) -> Self {
        Self {
            bounds: Bounds::new(0.0, 0.0, client_width, 0.0),
            client_width,
            scroll_width: client_width,
            ..Default::default()
        }
    }

    pub fn max_scroll(&self) -> f64 {
        (self.scroll_width - self.client_width).max(0.0)
    }

    /// Set the content width, keeping the scroll offset in range.
    pub fn set_scroll_width(&mut self, width: f64) {
        self.scroll_width = width.max(self.client_width);
        self.scroll_left = self.scroll_left.clamp(0.0, self.max_scroll());
    }

    pub fn set_client_width(&mut self, width: f64) {
        self.client_width = width.max(0.0);
        self.bounds.right = self.bounds.left + self.client_width;
        self.set_scroll_width(self.scroll_width);
    }

    /// Scroll to `offset`, clamped. Returns the applied offset.
    pub fn scroll_to(&mut self, offset: f64) -> f64 {
        self.scroll_left = offset.clamp(0.0, self.max_scroll());
        self.scroll_left
    }

    /// Whether the click landed on the horizontal scrollbar.
    pub fn is_on_scrollbar(&self, event: &PointerEvent, vertical: bool) -> bool {
        if self.scrollbar_height == 0.0 {
            return false;
        }
        let event = event.oriented(vertical);
        let bounds = self.bounds.oriented(vertical);
        event.client_y >= bounds.bottom - self.scrollbar_height
    }

    /// Normalised `[0, 1]` position of a click along the waveform.
    pub fn click_progress(&self, event: &PointerEvent, layout: &ClickLayout) -> f64 {
        let event = event.oriented(layout.vertical);
        let bounds = self.bounds.oriented(layout.vertical);
        let pixels = if layout.rtl {
            bounds.right - event.client_x
        } else {
            event.client_x - bounds.left
        };

        let progress = if !layout.fill_parent && layout.nominal_width < layout.parent_width {
            pixels * layout.pixel_ratio / layout.nominal_width
        } else {
            (pixels + self.scroll_left) / self.scroll_width
        };
        if progress.is_nan() {
            return 0.0;
        }
        progress.clamp(0.0, 1.0)
    }
}
