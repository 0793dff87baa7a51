//! Integration tests for the waveform view.


use std::cell::RefCell;
use std::rc::Rc;

use tilewave::peaks::Envelope;
use tilewave::playback::TickOutcome;
use tilewave::{Event, EventKind, PlaybackError, PointerEvent, WaveConfig, WaveViewError};

fn record(view: &mut tilewave::WaveView, kinds: &[EventKind]) -> Rc<RefCell<Vec<Event>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    for &kind in kinds {
        let log = log.clone();
        view.on(kind, move |e| log.borrow_mut().push(e.clone()));
    }
    log
}

fn kinds(log: &Rc<RefCell<Vec<Event>>>) -> Vec<EventKind> {
    log.borrow().iter().map(Event::kind).collect()
}

#[test]
fn test_load_fires_redraw_then_ready() {
    let (mut view, _) = fixtures::manual_view(WaveConfig::default());
    let log = record(&mut view, &[EventKind::Redraw, EventKind::Ready]);

    view.load_decoded(fixtures::mono_tone(2.0)).unwrap();

    assert_eq!(kinds(&log), vec![EventKind::Redraw, EventKind::Ready]);
    match &log.borrow()[0] {
        Event::Redraw { peaks, width } => {
            assert_eq!(*width, 500);
            assert_eq!(peaks.len(), 500);
        }
        other => panic!("Unexpected event {:?}", other),
    };
}

#[test]
fn test_seek_out_of_range_leaves_time_unchanged() {
    let (mut view, _) = fixtures::manual_view(WaveConfig::default());
    view.load_decoded(fixtures::mono_tone(4.0)).unwrap();
    view.seek_to(0.5).unwrap();

    let err = view.seek_to(1.5).unwrap_err();
    assert!(matches!(
        err,
        WaveViewError::Playback(PlaybackError::InvalidProgress(p)) if p == 1.5
    ));
    assert_eq!(view.current_time(), 2.0);
}

#[test]
fn test_seek_while_playing_resumes() {
    let (mut view, clock) = fixtures::manual_view(WaveConfig::default());
    view.load_decoded(fixtures::mono_tone(4.0)).unwrap();
    let log = record(
        &mut view,
        &[EventKind::Play, EventKind::Pause, EventKind::Seek],
    );

    view.play(None, None).unwrap();
    clock.advance(1.0);
    view.seek_to(0.75).unwrap();

    assert!(view.is_playing());
    assert_eq!(view.current_time(), 3.0);
    assert_eq!(
        kinds(&log),
        vec![
            EventKind::Play,
            EventKind::Pause,
            EventKind::Play,
            EventKind::Seek
        ]
    );
    assert!(view.playback().is_ticking());
}

#[test]
fn test_audio_process_until_finish() {
    let (mut view, clock) = fixtures::manual_view(WaveConfig::default());
    view.load_decoded(fixtures::mono_tone(1.0)).unwrap();
    let log = record(
        &mut view,
        &[EventKind::AudioProcess, EventKind::Finish, EventKind::Pause],
    );

    view.play(None, None).unwrap();
    clock.advance(0.5);
    assert_eq!(view.on_audio_process(), Some(TickOutcome::Progress(0.5)));
    assert_eq!(view.progress_position(), 250.0);

    clock.advance(0.6);
    assert_eq!(view.on_audio_process(), Some(TickOutcome::Finished));
    assert_eq!(view.on_audio_process(), None);
    assert_eq!(
        kinds(&log),
        vec![EventKind::AudioProcess, EventKind::Finish, EventKind::Pause]
    );
    assert_eq!(view.progress_position(), 500.0);
}

#[test]
fn test_stop_rewinds() {
    let (mut view, clock) = fixtures::manual_view(WaveConfig::default());
    view.load_decoded(fixtures::mono_tone(2.0)).unwrap();
    view.play(None, None).unwrap();
    clock.advance(1.0);
    view.on_audio_process();

    view.stop().unwrap();
    assert!(!view.is_playing());
    assert_eq!(view.current_time(), 0.0);
    assert_eq!(view.progress_position(), 0.0);
}

#[test]
fn test_skip_clamps_to_buffer() {
    let (mut view, _) = fixtures::manual_view(WaveConfig::default());
    view.load_decoded(fixtures::mono_tone(5.0)).unwrap();

    view.skip_forward(None).unwrap();
    assert_eq!(view.current_time(), 2.0);
    view.skip_forward(Some(10.0)).unwrap();
    assert_eq!(view.current_time(), 5.0);
    view.skip_backward(Some(100.0)).unwrap();
    assert_eq!(view.current_time(), 0.0);
}

#[test]
fn test_set_current_time_past_end_seeks_to_end() {
    let (mut view, _) = fixtures::manual_view(WaveConfig::default());
    view.load_decoded(fixtures::mono_tone(3.0)).unwrap();
    view.set_current_time(42.0).unwrap();
    assert_eq!(view.played_percents(), 1.0);
}

#[test]
fn test_mute_restores_volume() {
    let (mut view, _) = fixtures::manual_view(WaveConfig::default());
    view.set_volume(0.6);
    let log = record(&mut view, &[EventKind::Volume, EventKind::Mute]);

    view.set_mute(true);
    assert_eq!(view.volume(), 0.0);
    view.set_mute(true);
    view.toggle_mute();
    assert_eq!(view.volume(), 0.6);

    let events = log.borrow().clone();
    assert_eq!(
        events,
        vec![
            Event::Volume(0.0),
            Event::Mute(true),
            Event::Mute(true),
            Event::Volume(0.6),
            Event::Mute(false),
        ]
    );
}

#[test]
fn test_click_seeks_to_clicked_fraction() {
    let (mut view, _) = fixtures::manual_view(WaveConfig::default());
    view.load_decoded(fixtures::mono_tone(4.0)).unwrap();
    let log = record(&mut view, &[EventKind::Click, EventKind::Seek]);

    let progress = view.handle_click(PointerEvent::new(125.0, 10.0)).unwrap();
    assert_eq!(progress, Some(0.25));
    assert_eq!(view.current_time(), 1.0);
    assert_eq!(kinds(&log), vec![EventKind::Click, EventKind::Seek]);
}

#[test]
fn test_click_ignored_without_interaction() {
    let (mut view, _) = fixtures::manual_view(WaveConfig {
        interact: false,
        ..Default::default()
    });
    view.load_decoded(fixtures::mono_tone(4.0)).unwrap();
    assert_eq!(view.handle_click(PointerEvent::new(125.0, 10.0)).unwrap(), None);
    assert_eq!(view.current_time(), 0.0);
}

#[test]
fn test_scrolling_view_follows_cursor() {
    let (mut view, clock) = fixtures::manual_view(WaveConfig {
        scroll_parent: true,
        auto_center_immediately: true,
        ..Default::default()
    });
    // 100 s at 20 px/s is 2000 px in a 500 px container.
    view.load_peaks(Envelope::from_interleaved(&[0.5, -0.5].repeat(2000)), 100.0)
        .unwrap();
    assert_eq!(view.width(), 2000);
    let log = record(&mut view, &[EventKind::Scroll]);

    view.play(None, None).unwrap();
    clock.advance(50.0);
    view.on_audio_process();

    assert_eq!(view.viewport().scroll_left, 750.0);
    assert_eq!(log.borrow().as_slice(), &[Event::Scroll { offset: 750.0 }]);
}

#[test]
fn test_seek_and_center_snaps_viewport() {
    let (mut view, _) = fixtures::manual_view(WaveConfig {
        scroll_parent: true,
        ..Default::default()
    });
    view.load_peaks(Envelope::from_interleaved(&[0.5, -0.5].repeat(2000)), 100.0)
        .unwrap();

    view.seek_and_center(0.5).unwrap();
    assert_eq!(view.viewport().scroll_left, 750.0);
}

#[test]
fn test_redraw_requests_coalesce() {
    let (mut view, _) = fixtures::manual_view(WaveConfig::default());
    view.load_decoded(fixtures::mono_tone(1.0)).unwrap();
    let log = record(&mut view, &[EventKind::Redraw]);

    assert!(view.request_redraw());
    assert!(view.request_redraw());
    assert!(view.on_animation_frame());
    assert!(!view.on_animation_frame());
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_resize_container_redraws_wider() {
    let (mut view, _) = fixtures::manual_view(WaveConfig::default());
    view.load_decoded(fixtures::mono_tone(1.0)).unwrap();
    view.set_container_width(800.0);
    assert!(view.on_animation_frame());
    assert_eq!(view.width(), 800);
    assert_eq!(view.tiles().width(), 800);
}

#[test]
fn test_split_channels_stack_rows() {
    let (mut view, _) = fixtures::manual_view(WaveConfig {
        split_channels: true,
        height: 50,
        ..Default::default()
    });
    view.load_decoded(fixtures::stereo(1.0)).unwrap();
    assert_eq!(view.tiles().height(), 100);

    let image = view.render_image();
    assert_eq!(image.dimensions(), (500, 100));
}

#[test]
fn test_empty_forgets_audio() {
    let (mut view, _) = fixtures::manual_view(WaveConfig::default());
    view.load_decoded(fixtures::mono_tone(1.0)).unwrap();
    view.empty().unwrap();

    assert!(!view.is_ready());
    assert_eq!(view.width(), 0);
    assert_eq!(view.tiles().width(), 500, "Tiles should span the container");
    assert!(
        view.tiles().tiles().iter().any(|t| !t.is_blank()),
        "Cleared view should still show a baseline"
    );
    assert!(matches!(
        view.play(None, None),
        Err(WaveViewError::Playback(PlaybackError::NoAudio))
    ));
}

#[test]
fn test_destroy_fires_once_and_silences() {
    let (mut view, _) = fixtures::manual_view(WaveConfig::default());
    view.load_decoded(fixtures::mono_tone(1.0)).unwrap();
    let log = record(&mut view, &[EventKind::Destroy]);
    let liveness = view.liveness();

    view.destroy();
    view.destroy();

    assert_eq!(log.borrow().len(), 1);
    assert!(!liveness.is_alive());
    assert!(view.is_destroyed());
    assert!(matches!(view.seek_to(0.5), Err(WaveViewError::Destroyed)));
}
