//! The waveform view.
//!
//! [`WaveView`] ties the peak store, tiles, renderer, playback clock and
//! sync controller together behind one API and publishes [`Event`]s as
//! state changes. It is single-threaded: hosts (or [`crate::driver`]) call
//! [`WaveView::on_animation_frame`] on every display refresh and
//! [`WaveView::on_audio_process`] at the audio callback cadence.

use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;

use crate::audio::{AudioData, AudioError, DecodedAudio};
use crate::config::{ColorScheme, ConfigError, WaveConfig};
use crate::events::{Event, EventBus, EventKind, ListenerId};
use crate::gpu::{GpuContext, GpuError, TileTextures};
use crate::peaks::{Envelope, PeakStore};
use crate::playback::{
    AudioContext, AudioSource, HardwareClock, PlaybackClock, PlaybackError, SilentSource,
    TickOutcome, DEFAULT_SAMPLE_RATE, SCRIPT_BUFFER_SIZE,
};
use crate::render::{composite, CompositeOptions, TileSet, WaveformRenderer};
use crate::scheduler::{FrameScheduler, Liveness};
use crate::sync::SyncController;
use crate::viewport::{ClickLayout, PointerEvent, Viewport};

/// Errors surfaced by [`WaveView`].
#[derive(Debug, thiserror::Error)]
pub enum WaveViewError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    #[error("View has been destroyed")]
    Destroyed,
}

pub struct WaveView {
    config: WaveConfig,
    colors: ColorScheme,
    peaks: PeakStore,
    tiles: TileSet,
    renderer: WaveformRenderer,
    clock: PlaybackClock,
    sync: SyncController,
    events: EventBus,
    scheduler: FrameScheduler<()>,
    tick_interval: Duration,
    /// Drawn width in device pixels.
    width: u32,
    ready: bool,
    muted: bool,
    saved_volume: f32,
    destroyed: bool,
}

impl std::fmt::Debug for WaveView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaveView")
            .field("width", &self.width)
            .field("tiles", &self.tiles.len())
            .field("clock", &self.clock)
            .field("ready", &self.ready)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl WaveView {
    /// Create a view driven by the process-wide audio context.
    pub fn new(config: WaveConfig) -> Result<Self, WaveViewError> {
        let context = AudioContext::shared();
        let mut view = Self::with_clock(config, context.clock(), Box::new(SilentSource::new()))?;
        view.tick_interval = context.tick_interval();
        Ok(view)
    }

    pub fn with_clock(
        config: WaveConfig,
        clock: Arc<dyn HardwareClock>,
        source: Box<dyn AudioSource>,
    ) -> Result<Self, WaveViewError> {
        config.validate()?;
        let colors = config.color_scheme()?;

        Ok(Self {
            tiles: TileSet::from_config(&config)?,
            renderer: WaveformRenderer::from_config(&config),
            sync: SyncController::from_config(&config),
            clock: PlaybackClock::new(clock, source),
            peaks: PeakStore::new(),
            events: EventBus::new(),
            scheduler: FrameScheduler::new(),
            tick_interval: Duration::from_secs_f64(
                SCRIPT_BUFFER_SIZE as f64 / DEFAULT_SAMPLE_RATE as f64,
            ),
            width: 0,
            ready: false,
            muted: false,
            saved_volume: 1.0,
            destroyed: false,
            colors,
            config,
        })
    }

    fn ensure_alive(&self) -> Result<(), WaveViewError> {
        if self.destroyed {
            return Err(WaveViewError::Destroyed);
        }
        Ok(())
    }

    // ---- events ----

    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> ListenerId
    where
        F: FnMut(&Event) + 'static,
    {
        self.events.on(kind, handler)
    }

    pub fn once<F>(&mut self, kind: EventKind, handler: F) -> ListenerId
    where
        F: FnMut(&Event) + 'static,
    {
        self.events.once(kind, handler)
    }

    pub fn un(&mut self, id: ListenerId) -> bool {
        self.events.un(id)
    }

    pub fn un_all(&mut self) {
        self.events.un_all();
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    // ---- accessors ----

    pub fn config(&self) -> &WaveConfig {
        &self.config
    }

    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    pub fn peak_store(&self) -> &PeakStore {
        &self.peaks
    }

    pub fn viewport(&self) -> &Viewport {
        self.sync.viewport()
    }

    /// Drawn waveform width in device pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Cursor position in CSS pixels.
    pub fn progress_position(&self) -> f64 {
        self.sync.last_position()
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn duration(&self) -> f64 {
        self.clock.duration()
    }

    pub fn current_time(&self) -> f64 {
        self.clock.current_time()
    }

    pub fn played_percents(&self) -> f64 {
        self.clock.played_percents()
    }

    pub fn playback(&self) -> &PlaybackClock {
        &self.clock
    }

    /// Cadence at which [`WaveView::on_audio_process`] should be called.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    pub fn liveness(&self) -> Liveness {
        self.scheduler.liveness()
    }

    // ---- loading ----

    /// Show `buffer` and reset playback to its start.
    pub fn load_decoded(&mut self, buffer: Arc<dyn DecodedAudio>) -> Result<(), WaveViewError> {
        self.ensure_alive()?;
        if buffer.number_of_channels() == 0 {
            return Err(AudioError::NoChannels.into());
        }
        if buffer.length() == 0 || buffer.duration() <= 0.0 {
            return Err(AudioError::EmptyBuffer.into());
        }
        if self.clock.is_playing() {
            self.stop()?;
        }

        let duration = buffer.duration();
        self.peaks.load(buffer);
        self.clock.load(duration);
        self.sync.reset();
        self.draw_buffer();
        self.ready = true;
        log::info!("Loaded {:.2}s of audio, drawn at {}px", duration, self.width);
        self.events.fire(Event::Ready);
        Ok(())
    }

    /// Decode-and-load convenience for loader output.
    pub fn load_audio_data(&mut self, audio: AudioData) -> Result<(), WaveViewError> {
        let buffer = audio.into_planar()?;
        self.load_decoded(Arc::new(buffer))
    }

    /// Show precomputed peaks for audio lasting `duration` seconds.
    pub fn load_peaks(&mut self, peaks: Envelope, duration: f64) -> Result<(), WaveViewError> {
        self.ensure_alive()?;
        if !(duration.is_finite() && duration > 0.0) {
            return Err(PlaybackError::InvalidTime(duration).into());
        }
        if self.clock.is_playing() {
            self.stop()?;
        }

        self.peaks.unload();
        self.peaks.set_precomputed(Some(peaks));
        self.clock.load(duration);
        self.sync.reset();
        self.draw_buffer();
        self.ready = true;
        self.events.fire(Event::Ready);
        Ok(())
    }

    /// Clear the waveform and forget the loaded audio.
    pub fn empty(&mut self) -> Result<(), WaveViewError> {
        self.ensure_alive()?;
        if self.clock.is_playing() {
            self.stop()?;
        }
        self.ready = false;
        self.peaks.unload();
        self.clock.unload();
        self.sync.reset();
        self.update_progress(0.0);

        self.width = 0;
        let parent = self.parent_width();
        self.tiles.resize(parent, self.config.device_height());
        let mut painter = self.tiles.painter(&self.colors);
        self.renderer
            .draw_peaks(&mut painter, &Envelope::new(), 0, None);
        Ok(())
    }

    // ---- drawing ----

    /// Container width in CSS pixels.
    pub fn set_container_width(&mut self, width: f64) {
        self.sync.viewport_mut().set_client_width(width);
        if self.ready {
            self.request_redraw();
        }
    }

    fn parent_width(&self) -> u32 {
        (self.sync.viewport().client_width * self.config.pixel_ratio).round() as u32
    }

    /// Queue a redraw for the next animation frame.
    pub fn request_redraw(&mut self) -> bool {
        self.scheduler.request(())
    }

    /// Run queued drawing. Returns true if a redraw happened.
    pub fn on_animation_frame(&mut self) -> bool {
        if self.destroyed || self.scheduler.take().is_none() {
            return false;
        }
        self.redraw();
        true
    }

    /// Redraw the waveform and put the cursor back in place.
    pub fn redraw(&mut self) {
        if self.destroyed {
            return;
        }
        self.draw_buffer();
        self.update_progress(self.clock.played_percents());
    }

    /// Lay out tiles for the current zoom and container and draw the peaks.
    pub fn draw_buffer(&mut self) {
        let pr = self.config.pixel_ratio;
        let nominal = (self.clock.duration() * self.config.min_px_per_sec * pr).round() as u32;
        let parent = self.parent_width();

        let mut width = nominal;
        let mut start = 0;
        let mut end = parent.max(width);
        if self.config.fill_parent && (!self.config.scroll_parent || nominal < parent) {
            width = parent;
            start = 0;
            end = width;
        }

        let merged = self
            .peaks
            .get_peaks(width as usize, start as usize, end as usize)
            .clone();
        let rows: Vec<Envelope> = if self.config.split_channels && self.peaks.number_of_channels() > 1 {
            (0..self.peaks.number_of_channels())
                .filter_map(|c| self.peaks.channel_peaks(c).cloned())
                .collect()
        } else {
            vec![merged.clone()]
        };

        let height = self.config.device_height() * rows.len().max(1) as u32;
        if width != self.width || height != self.tiles.height() {
            self.width = width;
            self.tiles.resize(width, height);
        } else {
            self.tiles.clear();
        }

        let viewport = self.sync.viewport_mut();
        if self.config.fill_parent || self.config.scroll_parent {
            viewport.set_scroll_width(width as f64 / pr);
        } else {
            viewport.set_scroll_width((width as f64 / pr).floor());
        }

        let mut painter = self.tiles.painter(&self.colors);
        for (channel, envelope) in rows.iter().enumerate() {
            self.renderer
                .draw_peaks(&mut painter, envelope, channel, Some((start, end)));
        }

        self.events.fire(Event::Redraw {
            peaks: merged,
            width,
        });
    }

    fn update_progress(&mut self, played: f64) {
        if let Some(update) = self.sync.progress(played, self.width) {
            if let Some(offset) = update.scroll {
                self.events.fire(Event::Scroll { offset });
            }
        }
    }

    /// Composite every tile into one image with the cursor drawn in.
    pub fn render_image(&self) -> RgbaImage {
        let cursor_width = (self.config.cursor_width as f64 * self.config.pixel_ratio).round() as u32;
        composite(
            &self.tiles,
            &CompositeOptions {
                progress: self.cursor_fraction(),
                background: self.colors.background,
                cursor: Some((self.colors.cursor, cursor_width)),
                rtl: self.config.rtl,
            },
        )
    }

    /// Upload every tile into GPU textures.
    pub fn upload_tiles(
        &self,
        ctx: &GpuContext,
        textures: &mut TileTextures,
    ) -> Result<(), WaveViewError> {
        textures.sync(ctx, &self.tiles, self.cursor_fraction())?;
        Ok(())
    }

    fn cursor_fraction(&self) -> f64 {
        if self.width == 0 {
            return 0.0;
        }
        self.sync.last_position() * self.config.pixel_ratio / self.width as f64
    }

    pub fn set_background_color(&mut self, color: Option<&str>) -> Result<(), WaveViewError> {
        let mut config = self.config.clone();
        config.background_color = color.map(str::to_string);
        self.colors = config.color_scheme()?;
        self.config = config;
        Ok(())
    }

    // ---- playback ----

    /// Poll the playback clock. Call at [`WaveView::tick_interval`].
    pub fn on_audio_process(&mut self) -> Option<TickOutcome> {
        if self.destroyed {
            return None;
        }
        let outcome = self.clock.tick()?;
        match outcome {
            TickOutcome::Finished => {
                self.update_progress(self.clock.played_percents());
                self.events.fire(Event::Finish);
                self.events.fire(Event::Pause);
            }
            TickOutcome::ScheduledPause => self.events.fire(Event::Pause),
            TickOutcome::Progress(time) => {
                self.update_progress(self.clock.played_percents());
                self.events.fire(Event::AudioProcess { time });
            }
        }
        Some(outcome)
    }

    /// Start playback, optionally between `start` and `end` seconds.
    pub fn play(&mut self, start: Option<f64>, end: Option<f64>) -> Result<bool, WaveViewError> {
        self.ensure_alive()?;
        let started = self.clock.play(start, end)?;
        if started {
            self.events.fire(Event::Play);
        }
        Ok(started)
    }

    /// Returns false if nothing was playing.
    pub fn pause(&mut self) -> bool {
        if self.clock.pause() {
            self.events.fire(Event::Pause);
            true
        } else {
            false
        }
    }

    /// Toggle playback; returns whether it is now playing.
    pub fn play_pause(&mut self) -> Result<bool, WaveViewError> {
        if self.clock.is_playing() {
            self.pause();
            Ok(false)
        } else {
            self.play(None, None)
        }
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    /// Jump to `progress` of the duration. Playback resumes if it was
    /// running; auto-scrolling is held off while seeking.
    pub fn seek_to(&mut self, progress: f64) -> Result<(), WaveViewError> {
        self.ensure_alive()?;
        if !(progress.is_finite() && (0.0..=1.0).contains(&progress)) {
            return Err(PlaybackError::InvalidProgress(progress).into());
        }
        if !self.clock.has_audio() {
            return Err(PlaybackError::NoAudio.into());
        }

        let was_playing = self.clock.is_playing();
        if was_playing {
            self.pause();
        }

        let scroll_parent = self.sync.set_scroll_parent(false);
        let seeked = self.clock.seek(Some(progress * self.clock.duration()), None);
        if seeked.is_ok() {
            self.update_progress(progress);
        }
        let resumed = if was_playing && seeked.is_ok() {
            self.play(None, None).map(|_| ())
        } else {
            Ok(())
        };
        self.sync.set_scroll_parent(scroll_parent);

        seeked?;
        resumed?;
        self.events.fire(Event::Seek { progress });
        Ok(())
    }

    /// Seek and scroll so the new position is centred.
    pub fn seek_and_center(&mut self, progress: f64) -> Result<(), WaveViewError> {
        self.seek_to(progress)?;
        if let Some(offset) = self.sync.recenter(progress) {
            self.events.fire(Event::Scroll { offset });
        }
        Ok(())
    }

    pub fn set_current_time(&mut self, seconds: f64) -> Result<(), WaveViewError> {
        let duration = self.clock.duration();
        if duration <= 0.0 {
            return Err(PlaybackError::NoAudio.into());
        }
        if seconds >= duration {
            self.seek_to(1.0)
        } else {
            self.seek_to(seconds / duration)
        }
    }

    /// Move by `offset` seconds, clamped to the buffer.
    pub fn skip(&mut self, offset: f64) -> Result<(), WaveViewError> {
        let duration = match self.clock.duration() {
            d if d > 0.0 => d,
            _ => 1.0,
        };
        let position = (self.clock.current_time() + offset).clamp(0.0, duration);
        self.seek_and_center(position / duration)
    }

    /// Skip ahead by `seconds`, or by `skip_length` when `None`.
    pub fn skip_forward(&mut self, seconds: Option<f64>) -> Result<(), WaveViewError> {
        self.skip(seconds.unwrap_or(self.config.skip_length))
    }

    pub fn skip_backward(&mut self, seconds: Option<f64>) -> Result<(), WaveViewError> {
        self.skip(-seconds.unwrap_or(self.config.skip_length))
    }

    /// Pause and rewind to the start.
    pub fn stop(&mut self) -> Result<(), WaveViewError> {
        self.pause();
        self.seek_to(0.0)?;
        self.update_progress(0.0);
        Ok(())
    }

    pub fn set_playback_rate(&mut self, rate: f64) -> Result<(), WaveViewError> {
        self.clock.set_playback_rate(rate)?;
        Ok(())
    }

    pub fn playback_rate(&self) -> f64 {
        self.clock.playback_rate()
    }

    pub fn volume(&self) -> f32 {
        self.clock.volume()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.clock.set_volume(volume);
        self.events.fire(Event::Volume(volume));
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_mute(&mut self) {
        self.set_mute(!self.muted);
    }

    /// Mute keeps the previous volume so unmuting restores it.
    pub fn set_mute(&mut self, mute: bool) {
        if mute == self.muted {
            self.events.fire(Event::Mute(self.muted));
            return;
        }
        if mute {
            self.saved_volume = self.clock.volume();
            self.clock.set_volume(0.0);
            self.muted = true;
            self.events.fire(Event::Volume(0.0));
        } else {
            self.clock.set_volume(self.saved_volume);
            self.muted = false;
            self.events.fire(Event::Volume(self.saved_volume));
        }
        self.events.fire(Event::Mute(self.muted));
    }

    // ---- interaction ----

    /// Translate a click into a seek. Returns the clicked progress, or
    /// `None` when interaction is off or the click hit the scrollbar.
    pub fn handle_click(&mut self, event: PointerEvent) -> Result<Option<f64>, WaveViewError> {
        self.ensure_alive()?;
        if !self.config.interact || self.sync.viewport().is_on_scrollbar(&event, self.config.vertical) {
            return Ok(None);
        }

        let layout = ClickLayout {
            rtl: self.config.rtl,
            vertical: self.config.vertical,
            fill_parent: self.config.fill_parent,
            pixel_ratio: self.config.pixel_ratio,
            nominal_width: self.width as f64,
            parent_width: self.parent_width() as f64,
        };
        let progress = self.sync.viewport().click_progress(&event, &layout);
        self.events.fire(Event::Click { event, progress });

        if self.clock.has_audio() {
            self.seek_to(progress)?;
        }
        Ok(Some(progress))
    }

    /// Host-initiated scroll, in CSS pixels.
    pub fn scroll(&mut self, offset: f64) -> f64 {
        let applied = self.sync.viewport_mut().scroll_to(offset);
        self.events.fire(Event::Scroll { offset: applied });
        applied
    }

    /// Tear down. Queued frames and later ticks become no-ops.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.events.fire(Event::Destroy);
        self.events.un_all();
        self.clock.pause();
        self.scheduler.detach();
        self.tiles.release();
        self.peaks.unload();
        self.ready = false;
        self.destroyed = true;
        log::debug!("Wave view destroyed");
    }
}

impl Drop for WaveView {
    fn drop(&mut self) {
        self.scheduler.detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PlanarBuffer;
    use crate::playback::ManualClock;

    fn view(config: WaveConfig) -> (WaveView, ManualClock) {
        let clock = ManualClock::new();
        let view = WaveView::with_clock(config, Arc::new(clock.clone()), Box::new(SilentSource::new()))
            .unwrap();
        (view, clock)
    }

    fn tone(seconds: usize) -> Arc<PlanarBuffer> {
        let samples = (0..seconds * 100).map(|i| ((i % 7) as f32 - 3.0) / 4.0).collect();
        Arc::new(PlanarBuffer::mono(samples, 100).unwrap())
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = WaveView::with_clock(
            WaveConfig {
                max_canvas_width: 3,
                ..Default::default()
            },
            Arc::new(ManualClock::new()),
            Box::new(SilentSource::new()),
        );
        assert!(matches!(result, Err(WaveViewError::Config(_))));
    }

    #[test]
    fn test_fill_parent_draws_container_width() {
        let (mut view, _) = view(WaveConfig::default());
        view.set_container_width(300.0);
        view.load_decoded(tone(2)).unwrap();
        assert_eq!(view.width(), 300);
        assert_eq!(view.peak_store().resolution(), 300);
        assert!(view.is_ready());
    }

    #[test]
    fn test_scroll_parent_uses_nominal_width() {
        let (mut view, _) = view(WaveConfig {
            scroll_parent: true,
            ..Default::default()
        });
        view.set_container_width(100.0);
        view.load_decoded(tone(10)).unwrap();
        assert_eq!(view.width(), 200);
        assert_eq!(view.viewport().scroll_width, 200.0);
        assert_eq!(view.viewport().max_scroll(), 100.0);
    }

    #[test]
    fn test_destroyed_view_rejects_calls() {
        let (mut view, _) = view(WaveConfig::default());
        view.destroy();
        assert!(matches!(view.play(None, None), Err(WaveViewError::Destroyed)));
        assert!(!view.request_redraw());
        assert!(!view.on_animation_frame());
        assert!(view.on_audio_process().is_none());
    }
}
