use std::sync::Arc;

use super::source::{AudioSource, HardwareClock};

#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("Progress must be a number between 0 and 1, got {0}")]
    InvalidProgress(f64),
    #[error("Invalid time: {0}")]
    InvalidTime(f64),
    #[error("Playback rate must be a positive number, got {0}")]
    InvalidRate(f64),
    #[error("No audio loaded")]
    NoAudio,
}

/// Where playback stands, as of the last sync point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackState {
    Playing { start_position: f64, last_sync: f64 },
    Paused { start_position: f64 },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Paused,
    Finished,
}

impl PlaybackState {
    pub fn phase(&self) -> Phase {
        match self {
            PlaybackState::Playing { .. } => Phase::Playing,
            PlaybackState::Paused { .. } => Phase::Paused,
            PlaybackState::Finished => Phase::Finished,
        }
    }

    /// Position in seconds at hardware time `now`, within `[0, duration]`.
    pub fn current_time(&self, now: f64, rate: f64, duration: f64) -> f64 {
        let time = match *self {
            PlaybackState::Playing {
                start_position,
                last_sync,
            } => start_position + (now - last_sync) * rate,
            PlaybackState::Paused { start_position } => start_position,
            PlaybackState::Finished => duration,
        };
        time.clamp(0.0, duration.max(0.0))
    }

    pub fn played_percents(&self, now: f64, rate: f64, duration: f64) -> f64 {
        if let PlaybackState::Finished = self {
            return 1.0;
        }
        if duration <= 0.0 {
            return 0.0;
        }
        self.current_time(now, rate, duration) / duration
    }
}

/// Result of one audio-process poll while playing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Reached the end of the buffer. Reported once per run.
    Finished,
    /// Reached the end requested by `play`.
    ScheduledPause,
    Progress(f64),
}

/// Resolved seek bounds in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekRange {
    pub start: f64,
    pub end: f64,
}

/// Playback position tracked against a free-running hardware clock.
pub struct PlaybackClock {
    clock: Arc<dyn HardwareClock>,
    source: Box<dyn AudioSource>,
    state: PlaybackState,
    duration: Option<f64>,
    rate: f64,
    scheduled_pause: Option<f64>,
    ticking: bool,
}

impl std::fmt::Debug for PlaybackClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackClock")
            .field("state", &self.state)
            .field("duration", &self.duration)
            .field("rate", &self.rate)
            .field("scheduled_pause", &self.scheduled_pause)
            .field("ticking", &self.ticking)
            .finish()
    }
}

impl PlaybackClock {
    pub fn new(clock: Arc<dyn HardwareClock>, source: Box<dyn AudioSource>) -> Self {
        Self {
            clock,
            source,
            state: PlaybackState::Paused {
                start_position: 0.0,
            },
            duration: None,
            rate: 1.0,
            scheduled_pause: None,
            ticking: false,
        }
    }

    /// Reset to the start of a buffer lasting `duration` seconds.
    pub fn load(&mut self, duration: f64) {
        self.pause();
        self.duration = Some(duration.max(0.0));
        self.state = PlaybackState::Paused {
            start_position: 0.0,
        };
        self.scheduled_pause = None;
    }

    pub fn unload(&mut self) {
        self.pause();
        self.duration = None;
        self.state = PlaybackState::Paused {
            start_position: 0.0,
        };
    }

    pub fn has_audio(&self) -> bool {
        self.duration.is_some()
    }

    /// Buffer duration in seconds, 0 when nothing is loaded.
    pub fn duration(&self) -> f64 {
        self.duration.unwrap_or(0.0)
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_playing(&self) -> bool {
        self.phase() == Phase::Playing
    }

    /// Whether audio-process polling is armed.
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn scheduled_pause(&self) -> Option<f64> {
        self.scheduled_pause
    }

    pub fn current_time(&self) -> f64 {
        self.state
            .current_time(self.clock.now(), self.rate, self.duration())
    }

    pub fn played_percents(&self) -> f64 {
        self.state
            .played_percents(self.clock.now(), self.rate, self.duration())
    }

    /// Start playing from `start` (or the current position) until `end`
    /// (or the end of the buffer).
    ///
    /// Returns `Ok(false)` without doing anything when playback already
    /// finished and no explicit start was given.
    pub fn play(&mut self, start: Option<f64>, end: Option<f64>) -> Result<bool, PlaybackError> {
        if self.duration.is_none() {
            return Err(PlaybackError::NoAudio);
        }
        if self.phase() == Phase::Finished && start.is_none() {
            return Ok(false);
        }

        let range = self.seek(start, end)?;
        self.scheduled_pause = Some(range.end);

        if let Err(e) = self.source.start(range.start) {
            log::warn!("Audio source failed to start at {:.3}s: {}", range.start, e);
        }

        self.state = PlaybackState::Playing {
            start_position: range.start,
            last_sync: self.clock.now(),
        };
        self.ticking = true;
        Ok(true)
    }

    /// Commit elapsed time and stop. Returns false if not playing.
    pub fn pause(&mut self) -> bool {
        let PlaybackState::Playing { .. } = self.state else {
            return false;
        };
        let position = self.current_time();
        self.scheduled_pause = None;
        self.stop_source();
        self.state = PlaybackState::Paused {
            start_position: position,
        };
        self.ticking = false;
        true
    }

    fn stop_source(&mut self) {
        if let Err(e) = self.source.stop() {
            log::trace!("Ignoring audio source stop error: {}", e);
        }
    }

    /// Move to `start` seconds, leaving the clock paused.
    ///
    /// Without `start` the current position is kept, wrapping to 0 if it
    /// reached the end. `end` defaults to the duration.
    pub fn seek(&mut self, start: Option<f64>, end: Option<f64>) -> Result<SeekRange, PlaybackError> {
        let duration = self.duration.ok_or(PlaybackError::NoAudio)?;
        for value in [start, end].into_iter().flatten() {
            if !value.is_finite() {
                return Err(PlaybackError::InvalidTime(value));
            }
        }

        self.pause();
        self.scheduled_pause = None;

        let start = match start {
            Some(s) => s.clamp(0.0, duration),
            None => {
                let current = self.current_time();
                if current >= duration {
                    0.0
                } else {
                    current
                }
            }
        };
        let end = end.map_or(duration, |e| e.clamp(0.0, duration));

        self.state = PlaybackState::Paused {
            start_position: start,
        };
        Ok(SeekRange { start, end })
    }

    /// Poll the clock. `None` when not playing.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        if !self.ticking || !self.is_playing() {
            return None;
        }
        let time = self.current_time();

        if time >= self.duration() {
            self.stop_source();
            self.scheduled_pause = None;
            self.state = PlaybackState::Finished;
            self.ticking = false;
            log::debug!("Playback finished at {:.3}s", time);
            return Some(TickOutcome::Finished);
        }
        if let Some(end) = self.scheduled_pause.filter(|&end| time >= end) {
            self.pause();
            self.state = PlaybackState::Paused {
                start_position: end.clamp(0.0, self.duration()),
            };
            return Some(TickOutcome::ScheduledPause);
        }
        Some(TickOutcome::Progress(time))
    }

    /// Stop at `end` seconds instead of the end of the buffer.
    pub fn set_play_end(&mut self, end: f64) {
        self.scheduled_pause = Some(end);
    }

    pub fn playback_rate(&self) -> f64 {
        self.rate
    }

    /// Change speed without moving the current position.
    pub fn set_playback_rate(&mut self, rate: f64) -> Result<(), PlaybackError> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(PlaybackError::InvalidRate(rate));
        }
        if let PlaybackState::Playing { .. } = self.state {
            self.state = PlaybackState::Playing {
                start_position: self.current_time(),
                last_sync: self.clock.now(),
            };
        }
        self.rate = rate;
        self.source.set_playback_rate(rate);
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        self.source.volume()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.source.set_volume(volume.clamp(0.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::{ManualClock, SilentSource};

    fn clock_with(duration: f64) -> (PlaybackClock, ManualClock) {
        let hw = ManualClock::new();
        let mut clock = PlaybackClock::new(Arc::new(hw.clone()), Box::new(SilentSource::new()));
        clock.load(duration);
        (clock, hw)
    }

    #[test]
    fn test_state_dispatch_is_pure() {
        let playing = PlaybackState::Playing {
            start_position: 1.0,
            last_sync: 10.0,
        };
        assert_eq!(playing.current_time(12.0, 1.0, 5.0), 3.0);
        assert_eq!(playing.current_time(12.0, 2.0, 5.0), 5.0);
        assert_eq!(PlaybackState::Finished.current_time(0.0, 1.0, 5.0), 5.0);
        assert_eq!(PlaybackState::Finished.played_percents(0.0, 1.0, 0.0), 1.0);
        assert_eq!(
            PlaybackState::Paused { start_position: 2.5 }.played_percents(99.0, 1.0, 5.0),
            0.5
        );
    }

    #[test]
    fn test_play_advances_with_hardware_clock() {
        let (mut clock, hw) = clock_with(10.0);
        assert!(clock.play(None, None).unwrap());
        hw.advance(3.0);
        assert!((clock.current_time() - 3.0).abs() < 1e-9);
        assert_eq!(clock.tick(), Some(TickOutcome::Progress(3.0)));
    }

    #[test]
    fn test_finish_reported_once() {
        let (mut clock, hw) = clock_with(2.0);
        clock.play(None, None).unwrap();
        hw.advance(2.5);
        assert_eq!(clock.current_time(), 2.0);
        assert_eq!(clock.tick(), Some(TickOutcome::Finished));
        assert_eq!(clock.phase(), Phase::Finished);
        assert_eq!(clock.tick(), None);
        assert!(!clock.is_ticking());
    }

    #[test]
    fn test_play_from_finished_requires_seek() {
        let (mut clock, hw) = clock_with(1.0);
        clock.play(None, None).unwrap();
        hw.advance(1.0);
        clock.tick();

        assert!(!clock.play(None, None).unwrap());
        assert_eq!(clock.phase(), Phase::Finished);

        let range = clock.seek(None, None).unwrap();
        assert_eq!(range.start, 0.0);
        assert_eq!(clock.phase(), Phase::Paused);
        assert!(clock.play(None, None).unwrap());
    }

    #[test]
    fn test_scheduled_pause() {
        let (mut clock, hw) = clock_with(10.0);
        clock.play(Some(1.0), Some(2.0)).unwrap();
        hw.advance(0.5);
        assert_eq!(clock.tick(), Some(TickOutcome::Progress(1.5)));
        hw.advance(0.6);
        assert_eq!(clock.tick(), Some(TickOutcome::ScheduledPause));
        assert_eq!(clock.phase(), Phase::Paused);
        assert_eq!(clock.current_time(), 2.0, "Pause lands on the requested end");
    }

    #[test]
    fn test_seek_clamps() {
        let (mut clock, _hw) = clock_with(4.0);
        assert_eq!(clock.seek(Some(-1.0), None).unwrap().start, 0.0);
        assert_eq!(clock.seek(Some(9.0), Some(12.0)).unwrap(), SeekRange { start: 4.0, end: 4.0 });
        assert!(matches!(
            clock.seek(Some(f64::NAN), None),
            Err(PlaybackError::InvalidTime(_))
        ));
    }

    #[test]
    fn test_playback_rate_change_keeps_position() {
        let (mut clock, hw) = clock_with(100.0);
        clock.play(None, None).unwrap();
        hw.advance(2.0);
        clock.set_playback_rate(2.0).unwrap();
        assert!((clock.current_time() - 2.0).abs() < 1e-9);
        hw.advance(1.0);
        assert!((clock.current_time() - 4.0).abs() < 1e-9);
        assert!(clock.set_playback_rate(0.0).is_err());
    }

    #[test]
    fn test_no_audio() {
        let mut clock = PlaybackClock::new(Arc::new(ManualClock::new()), Box::new(SilentSource::new()));
        assert!(matches!(clock.play(None, None), Err(PlaybackError::NoAudio)));
        assert!(matches!(clock.seek(Some(1.0), None), Err(PlaybackError::NoAudio)));
        assert_eq!(clock.played_percents(), 0.0);
        assert!(!clock.pause());
    }
}
