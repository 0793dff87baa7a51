//! Time sources and audio sinks the playback clock drives.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonic clock in seconds that keeps running on its own.
pub trait HardwareClock: Send + Sync {
    fn now(&self) -> f64;
}

/// Wall-clock time since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareClock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, seconds: f64) {
        self.set(self.now() + seconds);
    }
}

impl HardwareClock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

/// Errors reported by an [`AudioSource`]. Stopping a source that never
/// started is expected and callers treat it as harmless.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source has not been started")]
    NotStarted,
    #[error("Audio output failed: {0}")]
    Output(String),
}

/// The sink that actually produces sound.
pub trait AudioSource {
    /// Begin output at `offset` seconds into the buffer.
    fn start(&mut self, offset: f64) -> Result<(), SourceError>;

    fn stop(&mut self) -> Result<(), SourceError>;

    fn set_volume(&mut self, volume: f32);

    fn volume(&self) -> f32;

    fn set_playback_rate(&mut self, _rate: f64) {}
}

/// A source that produces no sound but tracks its own state.
#[derive(Debug, Clone, PartialEq)]
pub struct SilentSource {
    playing: bool,
    volume: f32,
    last_offset: Option<f64>,
}

impl Default for SilentSource {
    fn default() -> Self {
        Self {
            playing: false,
            volume: 1.0,
            last_offset: None,
        }
    }
}

impl SilentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Offset passed to the most recent `start`.
    pub fn last_offset(&self) -> Option<f64> {
        self.last_offset
    }
}

impl AudioSource for SilentSource {
    fn start(&mut self, offset: f64) -> Result<(), SourceError> {
        self.playing = true;
        self.last_offset = Some(offset);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SourceError> {
        if !self.playing {
            return Err(SourceError::NotStarted);
        }
        self.playing = false;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn volume(&self) -> f32 {
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(1.5);
        other.advance(0.25);
        assert_eq!(clock.now(), 1.75);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_silent_source_rejects_stop_before_start() {
        let mut source = SilentSource::new();
        assert!(matches!(source.stop(), Err(SourceError::NotStarted)));
        source.start(2.0).unwrap();
        assert_eq!(source.last_offset(), Some(2.0));
        assert!(source.stop().is_ok());
    }
}
