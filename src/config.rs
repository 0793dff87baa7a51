//! View configuration.
//!
//! [`WaveConfig`] mirrors the option set hosts pass when creating a view.
//! It round-trips through camelCase JSON and is validated once, before any
//! tile is allocated.

use image::Rgba;
use serde::{Deserialize, Serialize};

/// Errors raised while building or validating a [`WaveConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("maxCanvasWidth must be greater than 1, got {0}")]
    MaxCanvasWidthTooSmall(u32),
    #[error("maxCanvasWidth must be an even number, got {0}")]
    MaxCanvasWidthOdd(u32),
    #[error("pixelRatio must be a finite number greater than 0, got {0}")]
    InvalidPixelRatio(f64),
    #[error("height must be greater than 0")]
    ZeroHeight,
    #[error("minPxPerSec must be a finite number greater than 0, got {0}")]
    InvalidMinPxPerSec(f64),
    #[error("barWidth must be a finite, non-negative number, got {0}")]
    InvalidBarWidth(f64),
    #[error("invalid color for {field}: {value}")]
    InvalidColor { field: &'static str, value: String },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-channel colour override used when channels are drawn separately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelColors {
    pub wave_color: String,
    pub progress_color: String,
}

/// Options recognised by [`crate::WaveView`].
///
/// Lengths are CSS pixels unless noted; `pixel_ratio` converts them to
/// device pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaveConfig {
    /// Height of one channel row.
    pub height: u32,
    /// Device pixels per CSS pixel.
    pub pixel_ratio: f64,
    /// Maximum width of a single tile surface in device pixels. Must be even.
    pub max_canvas_width: u32,
    /// Minimum horizontal zoom.
    pub min_px_per_sec: f64,
    /// Draw bars of this width instead of a continuous wave.
    pub bar_width: Option<f64>,
    /// Space between bars. Derived from `bar_width` when unset.
    pub bar_gap: Option<f64>,
    /// Bars are never drawn shorter than this (device pixels).
    pub bar_min_height: Option<f64>,
    pub bar_radius: f64,
    /// Vertical amplitude scale.
    pub bar_height: f64,
    /// Scale by the loudest peak instead of full scale.
    pub normalize: bool,
    pub fill_parent: bool,
    pub scroll_parent: bool,
    pub rtl: bool,
    pub vertical: bool,
    pub auto_center: bool,
    pub auto_center_rate: f64,
    pub auto_center_immediately: bool,
    pub wave_color: String,
    pub progress_color: String,
    pub cursor_color: String,
    pub cursor_width: u32,
    pub background_color: Option<String>,
    /// Draw each channel in its own row instead of the merged envelope.
    pub split_channels: bool,
    pub channel_colors: Vec<ChannelColors>,
    /// Report clicks as seeks.
    pub interact: bool,
    /// Seconds moved by `skip_forward`/`skip_backward`.
    pub skip_length: f64,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            height: 128,
            pixel_ratio: 1.0,
            max_canvas_width: 4000,
            min_px_per_sec: 20.0,
            bar_width: None,
            bar_gap: None,
            bar_min_height: None,
            bar_radius: 0.0,
            bar_height: 1.0,
            normalize: false,
            fill_parent: true,
            scroll_parent: false,
            rtl: false,
            vertical: false,
            auto_center: true,
            auto_center_rate: 5.0,
            auto_center_immediately: false,
            wave_color: "#999999".to_string(),
            progress_color: "#555555".to_string(),
            cursor_color: "#333333".to_string(),
            cursor_width: 1,
            background_color: None,
            split_channels: false,
            channel_colors: Vec::new(),
            interact: true,
            skip_length: 2.0,
        }
    }
}

/// Bar geometry, in CSS pixels as configured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStyle {
    pub width: f64,
    pub gap: Option<f64>,
    pub min_height: Option<f64>,
    pub radius: f64,
}

/// The two mutually exclusive drawing styles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawMode {
    Bars(BarStyle),
    Continuous,
}

/// Wave/progress colour pair for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub wave: Rgba<u8>,
    pub progress: Rgba<u8>,
}

impl Palette {
    /// A progress layer is only needed when it would look different.
    pub fn has_progress(&self) -> bool {
        self.wave != self.progress
    }
}

/// All colours resolved from a [`WaveConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScheme {
    default: Palette,
    channels: Vec<Palette>,
    pub cursor: Rgba<u8>,
    pub background: Option<Rgba<u8>>,
}

impl ColorScheme {
    pub fn for_channel(&self, channel: usize) -> Palette {
        self.channels.get(channel).copied().unwrap_or(self.default)
    }

    pub fn has_progress(&self) -> bool {
        self.default.has_progress() || self.channels.iter().any(Palette::has_progress)
    }
}

impl WaveConfig {
    /// Parse a camelCase JSON document; missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject configurations the renderer cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_canvas_width <= 1 {
            return Err(ConfigError::MaxCanvasWidthTooSmall(self.max_canvas_width));
        }
        if self.max_canvas_width % 2 == 1 {
            return Err(ConfigError::MaxCanvasWidthOdd(self.max_canvas_width));
        }
        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0) {
            return Err(ConfigError::InvalidPixelRatio(self.pixel_ratio));
        }
        if self.height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if !(self.min_px_per_sec.is_finite() && self.min_px_per_sec > 0.0) {
            return Err(ConfigError::InvalidMinPxPerSec(self.min_px_per_sec));
        }
        if let Some(width) = self.bar_width {
            if !width.is_finite() || width < 0.0 {
                return Err(ConfigError::InvalidBarWidth(width));
            }
        }
        self.color_scheme()?;
        Ok(())
    }

    pub fn draw_mode(&self) -> DrawMode {
        match self.bar_width {
            Some(width) if width > 0.0 => DrawMode::Bars(BarStyle {
                width,
                gap: self.bar_gap,
                min_height: self.bar_min_height,
                radius: self.bar_radius,
            }),
            _ => DrawMode::Continuous,
        }
    }

    /// Height of one channel row in device pixels.
    pub fn device_height(&self) -> u32 {
        (self.height as f64 * self.pixel_ratio).round() as u32
    }

    pub fn color_scheme(&self) -> Result<ColorScheme, ConfigError> {
        let default = Palette {
            wave: color_field("waveColor", &self.wave_color)?,
            progress: color_field("progressColor", &self.progress_color)?,
        };
        let channels = self
            .channel_colors
            .iter()
            .map(|c| {
                Ok(Palette {
                    wave: color_field("channelColors.waveColor", &c.wave_color)?,
                    progress: color_field("channelColors.progressColor", &c.progress_color)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let background = self
            .background_color
            .as_deref()
            .map(|c| color_field("backgroundColor", c))
            .transpose()?;

        Ok(ColorScheme {
            default,
            channels,
            cursor: color_field("cursorColor", &self.cursor_color)?,
            background,
        })
    }
}

fn color_field(field: &'static str, value: &str) -> Result<Rgba<u8>, ConfigError> {
    parse_hex_color(value).ok_or_else(|| ConfigError::InvalidColor {
        field,
        value: value.to_string(),
    })
}

/// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` into an RGBA colour.
pub fn parse_hex_color(hex: &str) -> Option<Rgba<u8>> {
    let hex = hex.trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 17;
            }
            Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
        }
        6 => Some(Rgba([channel(0)?, channel(2)?, channel(4)?, 255])),
        8 => Some(Rgba([channel(0)?, channel(2)?, channel(4)?, channel(6)?])),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#00ff88"), Some(Rgba([0, 255, 136, 255])));
        assert_eq!(parse_hex_color("ffffff"), Some(Rgba([255, 255, 255, 255])));
        assert_eq!(parse_hex_color("#333"), Some(Rgba([51, 51, 51, 255])));
        assert_eq!(parse_hex_color("#00000080"), Some(Rgba([0, 0, 0, 128])));
        assert_eq!(parse_hex_color("invalid"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = WaveConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_canvas_width, 4000);
        assert_eq!(config.draw_mode(), DrawMode::Continuous);
    }

    #[test]
    fn test_max_canvas_width_must_be_even_and_above_one() {
        let config = WaveConfig { max_canvas_width: 1, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::MaxCanvasWidthTooSmall(1))));

        let config = WaveConfig { max_canvas_width: 4001, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::MaxCanvasWidthOdd(4001))));
    }

    #[test]
    fn test_rejects_bad_pixel_ratio_and_color() {
        let config = WaveConfig { pixel_ratio: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPixelRatio(_))));

        let config = WaveConfig { wave_color: "nope".into(), ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidColor { field: "waveColor", .. })
        ));
    }

    #[test]
    fn test_from_json_uses_defaults_for_missing_keys() {
        let config = WaveConfig::from_json(r#"{"barWidth": 2, "pixelRatio": 2}"#).unwrap();
        assert_eq!(config.height, 128);
        assert_eq!(config.device_height(), 256);
        match config.draw_mode() {
            DrawMode::Bars(style) => {
                assert_eq!(style.width, 2.0);
                assert_eq!(style.gap, None);
            }
            DrawMode::Continuous => panic!("barWidth should select bar mode"),
        }

        assert!(WaveConfig::from_json(r#"{"maxCanvasWidth": 3}"#).is_err());
    }

    #[test]
    fn test_zero_bar_width_is_continuous() {
        let config = WaveConfig { bar_width: Some(0.0), ..Default::default() };
        assert_eq!(config.draw_mode(), DrawMode::Continuous);
    }

    #[test]
    fn test_channel_palettes_fall_back_to_default() {
        let config = WaveConfig {
            channel_colors: vec![ChannelColors {
                wave_color: "#ff0000".into(),
                progress_color: "#ff0000".into(),
            }],
            ..Default::default()
        };
        let scheme = config.color_scheme().unwrap();
        assert_eq!(scheme.for_channel(0).wave, Rgba([255, 0, 0, 255]));
        assert!(!scheme.for_channel(0).has_progress());
        assert_eq!(scheme.for_channel(1).wave, Rgba([153, 153, 153, 255]));
        assert!(scheme.has_progress());
    }
}
