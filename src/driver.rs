//! Interval driver for hosts without their own audio callback or
//! display refresh.
//!
//! A [`Driver`] runs one local task that polls the view's playback clock
//! at its tick interval and flushes queued redraws at the frame rate. It
//! must be started inside a [`tokio::task::LocalSet`] because the view is
//! not `Send`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::playback::{HardwareClock, TickOutcome};
use crate::view::WaveView;

/// Roughly 60 Hz.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Seconds since creation on tokio's clock, so paused test time drives
/// playback too.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareClock for TokioClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

#[derive(Debug)]
pub struct Driver {
    handle: JoinHandle<()>,
}

impl Driver {
    /// Start pumping `view` at its own tick interval and the default
    /// frame rate.
    pub fn spawn(view: Rc<RefCell<WaveView>>) -> Self {
        let tick = view.borrow().tick_interval();
        Self::spawn_with_intervals(view, tick, DEFAULT_FRAME_INTERVAL)
    }

    pub fn spawn_with_intervals(
        view: Rc<RefCell<WaveView>>,
        tick_interval: Duration,
        frame_interval: Duration,
    ) -> Self {
        let liveness = view.borrow().liveness();
        let handle = tokio::task::spawn_local(async move {
            let mut audio = tokio::time::interval(tick_interval);
            let mut frames = tokio::time::interval(frame_interval);
            audio.set_missed_tick_behavior(MissedTickBehavior::Delay);
            frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
            log::debug!(
                "Driver started: audio every {:?}, frames every {:?}",
                tick_interval,
                frame_interval
            );

            loop {
                tokio::select! {
                    _ = audio.tick() => {
                        if !liveness.is_alive() {
                            break;
                        }
                        let Ok(mut view) = view.try_borrow_mut() else {
                            log::trace!("View busy, skipping audio tick");
                            continue;
                        };
                        if let Some(TickOutcome::Finished) = view.on_audio_process() {
                            log::debug!("Playback finished at {:.3}s", view.current_time());
                        }
                    }
                    _ = frames.tick() => {
                        if !liveness.is_alive() {
                            break;
                        }
                        if let Ok(mut view) = view.try_borrow_mut() {
                            view.on_animation_frame();
                        }
                    }
                }
            }
            log::debug!("Driver stopped: view destroyed");
        });

        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the pumps. Ticks already in flight are dropped.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
