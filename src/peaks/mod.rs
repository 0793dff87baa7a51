//! Min/max peak extraction.
//!
//! [`PeakStore`] reduces a decoded buffer to one [`Peak`] per column at a
//! requested resolution. Columns are computed lazily and memoised until the
//! resolution changes, so drawing a visible window of a long track only
//! touches the samples under that window.

mod envelope;

pub use envelope::{Envelope, Peak};

use std::sync::Arc;

use crate::audio::DecodedAudio;

/// Each column window is sampled at `window / DEFAULT_SUBSAMPLE_DIVISOR`
/// stride (at least every sample).
pub const DEFAULT_SUBSAMPLE_DIVISOR: usize = 10;

static EMPTY: Envelope = Envelope::new();

pub struct PeakStore {
    buffer: Option<Arc<dyn DecodedAudio>>,
    precomputed: Option<Envelope>,
    resolution: usize,
    split: Vec<Envelope>,
    merged: Envelope,
    filled: Vec<bool>,
    subsample_divisor: usize,
}

impl Default for PeakStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PeakStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeakStore")
            .field("has_audio", &self.buffer.is_some())
            .field("precomputed", &self.precomputed.as_ref().map(Envelope::len))
            .field("resolution", &self.resolution)
            .finish()
    }
}

impl PeakStore {
    pub fn new() -> Self {
        Self {
            buffer: None,
            precomputed: None,
            resolution: 0,
            split: Vec::new(),
            merged: Envelope::new(),
            filled: Vec::new(),
            subsample_divisor: DEFAULT_SUBSAMPLE_DIVISOR,
        }
    }

    pub fn with_subsample_divisor(mut self, divisor: usize) -> Self {
        self.subsample_divisor = divisor.max(1);
        self
    }

    /// Replace the source buffer and drop every cached column.
    pub fn load(&mut self, buffer: Arc<dyn DecodedAudio>) {
        log::debug!(
            "Peak store loaded {} channel(s), {} frames",
            buffer.number_of_channels(),
            buffer.length()
        );
        self.buffer = Some(buffer);
        self.precomputed = None;
        self.invalidate();
    }

    pub fn unload(&mut self) {
        self.buffer = None;
        self.precomputed = None;
        self.invalidate();
    }

    /// Serve `envelope` for every resolution instead of computing peaks.
    pub fn set_precomputed(&mut self, envelope: Option<Envelope>) {
        self.precomputed = envelope;
    }

    pub fn precomputed(&self) -> Option<&Envelope> {
        self.precomputed.as_ref()
    }

    pub fn buffer(&self) -> Option<&Arc<dyn DecodedAudio>> {
        self.buffer.as_ref()
    }

    pub fn has_audio(&self) -> bool {
        self.buffer.is_some()
    }

    pub fn duration(&self) -> Option<f64> {
        self.buffer.as_ref().map(|b| b.duration())
    }

    pub fn number_of_channels(&self) -> usize {
        self.buffer.as_ref().map_or(0, |b| b.number_of_channels())
    }

    /// Resolution of the cached envelopes, 0 if none.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    fn invalidate(&mut self) {
        self.resolution = 0;
        self.split.clear();
        self.merged = Envelope::new();
        self.filled.clear();
    }

    /// Merged envelope of `resolution` columns with `[first, last]` computed.
    ///
    /// Columns outside that range keep whatever an earlier call left in them
    /// (zero if never computed). Without audio the result is empty.
    pub fn get_peaks(&mut self, resolution: usize, first: usize, last: usize) -> &Envelope {
        if self.precomputed.is_some() {
            return self.precomputed.as_ref().unwrap_or(&EMPTY);
        }
        let Some(buffer) = self.buffer.clone() else {
            return &EMPTY;
        };
        let total = buffer.length();
        let channels = buffer.number_of_channels();
        if resolution == 0 || total == 0 || channels == 0 {
            return &EMPTY;
        }

        if resolution != self.resolution {
            self.resolution = resolution;
            self.split = vec![Envelope::zeroed(resolution); channels];
            self.merged = Envelope::zeroed(resolution);
            self.filled = vec![false; resolution];
        }

        let last = last.min(resolution - 1);
        if first > last {
            return &self.merged;
        }
        let pending: Vec<usize> = (first..=last).filter(|&i| !self.filled[i]).collect();
        if pending.is_empty() {
            return &self.merged;
        }

        let window = total as f64 / resolution as f64;
        let step = ((window / self.subsample_divisor as f64) as usize).max(1);

        for (channel, envelope) in self.split.iter_mut().enumerate() {
            let data = buffer.channel_data(channel);
            for &column in &pending {
                let peak = column_peak(data, column, resolution, step);
                envelope.set(column, peak);

                let merged = if channel == 0 {
                    peak
                } else {
                    let current = self.merged.get(column).unwrap_or_default();
                    Peak::new(current.max.max(peak.max), current.min.min(peak.min))
                };
                self.merged.set(column, merged);
            }
        }
        for &column in &pending {
            self.filled[column] = true;
        }
        log::trace!(
            "Computed {} peak column(s) at resolution {}",
            pending.len(),
            resolution
        );

        &self.merged
    }

    /// Per-channel envelope at the cached resolution.
    pub fn channel_peaks(&self, channel: usize) -> Option<&Envelope> {
        if let Some(precomputed) = &self.precomputed {
            return (channel == 0).then_some(precomputed);
        }
        self.split.get(channel)
    }
}

fn column_peak(data: &[f32], column: usize, resolution: usize, step: usize) -> Peak {
    let total = data.len();
    let start = column * total / resolution;
    let end = ((column + 1) * total / resolution).min(total);
    let Some(&first) = data.get(start) else {
        return Peak::default();
    };

    let mut peak = Peak::new(first, first);
    for &value in data[start..end.max(start)].iter().step_by(step) {
        if value > peak.max {
            peak.max = value;
        }
        if value < peak.min {
            peak.min = value;
        }
    }
    peak
}
