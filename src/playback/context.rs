//! Process-wide audio context.
//!
//! Every view in a process shares one hardware clock, created on first use
//! and torn down only by an explicit [`AudioContext::shutdown`].

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use super::source::{HardwareClock, SystemClock};

/// Frames per audio-process callback.
pub const SCRIPT_BUFFER_SIZE: u32 = 16384;

pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

static SHARED: Mutex<Option<Arc<AudioContext>>> = Mutex::new(None);

pub struct AudioContext {
    clock: Arc<dyn HardwareClock>,
    sample_rate: u32,
}

impl std::fmt::Debug for AudioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioContext")
            .field("now", &self.clock.now())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

impl AudioContext {
    pub fn new(clock: Arc<dyn HardwareClock>, sample_rate: u32) -> Self {
        Self {
            clock,
            sample_rate: sample_rate.max(1),
        }
    }

    /// The process-wide context, created on first call.
    pub fn shared() -> Arc<AudioContext> {
        let mut slot = SHARED.lock().unwrap_or_else(PoisonError::into_inner);
        slot.get_or_insert_with(|| {
            log::info!("Creating shared audio context");
            Arc::new(AudioContext::new(
                Arc::new(SystemClock::new()),
                DEFAULT_SAMPLE_RATE,
            ))
        })
        .clone()
    }

    /// Drop the shared context. Returns false if none existed.
    ///
    /// Views created earlier keep their clock alive; the next
    /// [`AudioContext::shared`] call starts a fresh one.
    pub fn shutdown() -> bool {
        let mut slot = SHARED.lock().unwrap_or_else(PoisonError::into_inner);
        let existed = slot.take().is_some();
        if existed {
            log::info!("Shared audio context shut down");
        }
        existed
    }

    pub fn is_initialized() -> bool {
        SHARED
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn clock(&self) -> Arc<dyn HardwareClock> {
        self.clock.clone()
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// How often the audio-process callback fires.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(SCRIPT_BUFFER_SIZE as f64 / self.sample_rate as f64)
    }
}
