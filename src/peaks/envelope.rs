/// Extremes observed in one column of the waveform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Peak {
    pub max: f32,
    pub min: f32,
}

impl Peak {
    pub const fn new(max: f32, min: f32) -> Self {
        Self { max, min }
    }

    /// Largest magnitude of the pair.
    pub fn magnitude(&self) -> f32 {
        self.max.abs().max(self.min.abs())
    }
}

/// One [`Peak`] per logical column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Envelope {
    peaks: Vec<Peak>,
}

impl Envelope {
    pub const fn new() -> Self {
        Self { peaks: Vec::new() }
    }

    pub fn zeroed(len: usize) -> Self {
        Self {
            peaks: vec![Peak::default(); len],
        }
    }

    pub fn from_peaks(peaks: Vec<Peak>) -> Self {
        Self { peaks }
    }

    /// `[max0, min0, max1, min1, ...]`. A trailing odd value is ignored.
    pub fn from_interleaved(data: &[f32]) -> Self {
        Self {
            peaks: data
                .chunks_exact(2)
                .map(|pair| Peak::new(pair[0], pair[1]))
                .collect(),
        }
    }

    /// One magnitude per column; minima are zero.
    pub fn from_absolute(data: &[f32]) -> Self {
        Self {
            peaks: data.iter().map(|&v| Peak::new(v, 0.0)).collect(),
        }
    }

    /// Externally supplied peaks: interleaved pairs if any value is
    /// negative, absolute magnitudes otherwise.
    pub fn from_raw(data: &[f32]) -> Self {
        if data.iter().any(|v| *v < 0.0) {
            Self::from_interleaved(data)
        } else {
            Self::from_absolute(data)
        }
    }

    pub fn to_interleaved(&self) -> Vec<f32> {
        self.peaks.iter().flat_map(|p| [p.max, p.min]).collect()
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn as_slice(&self) -> &[Peak] {
        &self.peaks
    }

    pub fn get(&self, column: usize) -> Option<Peak> {
        self.peaks.get(column).copied()
    }

    pub(crate) fn set(&mut self, column: usize, peak: Peak) {
        if let Some(slot) = self.peaks.get_mut(column) {
            *slot = peak;
        }
    }

    pub fn has_negative_min(&self) -> bool {
        self.peaks.iter().any(|p| p.min < 0.0)
    }

    /// Copy with every minimum replaced by the negated maximum.
    pub fn mirrored(&self) -> Self {
        Self {
            peaks: self.peaks.iter().map(|p| Peak::new(p.max, -p.max)).collect(),
        }
    }

    /// Largest magnitude in the envelope, 0 when empty.
    pub fn abs_max(&self) -> f32 {
        self.peaks.iter().map(Peak::magnitude).fold(0.0, f32::max)
    }
}
