use std::path::Path;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use super::*;
use crate::audio::fake::FakeEngine;
use crate::audio::{PlaybackState, PlayerEvent, ProgressSnapshot};
use crate::config::{PlaybackSettings, TrackEndSetting};
use crate::library::Track;

const WAIT: Duration = Duration::from_secs(2);

#[derive(Default)]
struct RecordingView {
    playlist: Vec<String>,
    now_playing: Option<String>,
    playing: bool,
    progress: Vec<(ProgressSnapshot, String, String)>,
    errors: Vec<String>,
}

impl PlayerView for RecordingView {
    fn on_playlist_changed(&mut self, names: &[String]) {
        self.playlist = names.to_vec();
    }

    fn on_now_playing(&mut self, name: Option<&str>) {
        self.now_playing = name.map(str::to_string);
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot, elapsed: &str, total: &str) {
        self.progress
            .push((*snapshot, elapsed.to_string(), total.to_string()));
    }

    fn on_play_state_changed(&mut self, playing: bool) {
        self.playing = playing;
    }

    fn on_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }
}

struct Harness {
    engine: Arc<FakeEngine>,
    controller: PlaybackController,
    events: Receiver<PlayerEvent>,
    view: RecordingView,
}

impl Harness {
    fn new(tracks: &[(&str, f64)]) -> Self {
        Self::with_settings(tracks, PlaybackSettings {
            poll_interval_ms: 10,
            ..PlaybackSettings::default()
        })
    }

    fn with_settings(tracks: &[(&str, f64)], settings: PlaybackSettings) -> Self {
        let engine = Arc::new(FakeEngine::with_durations(tracks));
        let (tx, rx) = mpsc::channel();
        let mut controller = PlaybackController::new(engine.clone(), tx, &settings);
        let mut view = RecordingView::default();
        controller.add_tracks(
            tracks.iter().map(|(p, _)| Track::bare(*p)).collect(),
            &mut view,
        );
        Self {
            engine,
            controller,
            events: rx,
            view,
        }
    }

    fn current_name(&self) -> Option<String> {
        self.controller.current_track().map(|t| t.display.clone())
    }

    /// Pump poller events into the controller until `done` holds or time runs out.
    fn pump_until(&mut self, mut done: impl FnMut(&Self) -> bool) -> bool {
        let deadline = Instant::now() + WAIT;
        while Instant::now() < deadline {
            if done(self) {
                return true;
            }
            if let Ok(ev) = self.events.recv_timeout(Duration::from_millis(20)) {
                self.controller.handle_event(ev, &mut self.view);
            }
        }
        done(self)
    }
}

#[test]
fn add_tracks_publishes_playlist_names() {
    let h = Harness::new(&[("A.mp3", 10.0), ("B.wav", 20.0)]);
    assert_eq!(h.view.playlist, vec!["A.mp3", "B.wav"]);
    assert_eq!(h.controller.state(), PlaybackState::Stopped);
}

#[test]
fn select_next_next_wraps_around() {
    let mut h = Harness::new(&[("A.mp3", 10.0), ("B.wav", 20.0)]);

    h.controller.select_song(0, &mut h.view);
    assert_eq!(h.controller.state(), PlaybackState::Playing);
    assert_eq!(h.current_name().as_deref(), Some("A.mp3"));
    assert_eq!(h.view.now_playing.as_deref(), Some("A.mp3"));
    assert!(h.view.playing);

    h.controller.next(&mut h.view);
    assert_eq!(h.current_name().as_deref(), Some("B.wav"));
    assert_eq!(h.engine.state().loaded.as_deref(), Some(Path::new("B.wav")));

    h.controller.next(&mut h.view);
    assert_eq!(h.current_name().as_deref(), Some("A.mp3"));
    assert_eq!(h.controller.state(), PlaybackState::Playing);
}

#[test]
fn previous_then_next_returns_to_start() {
    let mut h = Harness::new(&[("a.mp3", 1.0), ("b.mp3", 1.0), ("c.mp3", 1.0)]);
    h.controller.select_song(1, &mut h.view);
    h.controller.previous(&mut h.view);
    assert_eq!(h.controller.current_index(), Some(0));
    h.controller.previous(&mut h.view);
    assert_eq!(h.controller.current_index(), Some(2));
    h.controller.next(&mut h.view);
    h.controller.next(&mut h.view);
    assert_eq!(h.controller.current_index(), Some(1));
}

#[test]
fn next_on_empty_playlist_is_a_noop() {
    let mut h = Harness::new(&[]);
    h.controller.next(&mut h.view);
    h.controller.previous(&mut h.view);
    assert_eq!(h.controller.state(), PlaybackState::Stopped);
    assert!(h.engine.state().loaded.is_none());
    assert!(h.view.errors.is_empty());
}

#[test]
fn toggle_while_stopped_does_nothing() {
    let mut h = Harness::new(&[("a.mp3", 10.0)]);
    h.controller.toggle_play_pause(&mut h.view);
    assert_eq!(h.controller.state(), PlaybackState::Stopped);
    assert!(!h.engine.state().playing);
}

#[test]
fn pause_resume_keeps_position_and_never_seeks() {
    let mut h = Harness::new(&[("a.mp3", 200.0)]);
    h.controller.select_song(0, &mut h.view);
    h.engine.state().position = 42.5;

    h.controller.toggle_play_pause(&mut h.view);
    assert_eq!(h.controller.state(), PlaybackState::Paused);
    assert!(!h.engine.state().playing);
    assert!(!h.view.playing);
    assert!(!h.controller.poller_running());

    h.controller.toggle_play_pause(&mut h.view);
    assert_eq!(h.controller.state(), PlaybackState::Playing);
    assert!(h.engine.state().playing);
    assert!(h.view.playing);

    let s = h.engine.state();
    assert_eq!(s.position, 42.5);
    assert!(s.seeks.is_empty());
}

#[test]
fn seek_half_of_200s_track_lands_on_100s() {
    let mut h = Harness::new(&[("long.mp3", 200.0)]);
    h.controller.select_song(0, &mut h.view);
    h.controller.seek(0.5, &mut h.view);

    assert_eq!(h.engine.state().seeks, vec![100.0]);
    let (snap, elapsed, total) = h.view.progress.last().cloned().unwrap();
    assert_eq!(snap, ProgressSnapshot::new(100.0, 200.0));
    assert_eq!(elapsed, "1:40");
    assert_eq!(total, "3:20");
}

#[test]
fn seek_clamps_fraction_into_track() {
    let mut h = Harness::new(&[("a.mp3", 100.0)]);
    h.controller.select_song(0, &mut h.view);
    h.controller.seek(1.7, &mut h.view);
    h.controller.seek(-0.2, &mut h.view);
    assert_eq!(h.engine.state().seeks, vec![100.0, 0.0]);
}

#[test]
fn seek_without_track_is_ignored() {
    let mut h = Harness::new(&[("a.mp3", 100.0)]);
    h.controller.seek(0.5, &mut h.view);
    assert!(h.engine.state().seeks.is_empty());
    assert!(h.view.progress.is_empty());
}

#[test]
fn seek_failure_is_swallowed_without_state_change() {
    let mut h = Harness::new(&[("a.mp3", 100.0)]);
    h.controller.select_song(0, &mut h.view);
    h.controller.toggle_play_pause(&mut h.view);
    h.engine.state().seek_fails = true;

    h.controller.seek(0.3, &mut h.view);
    assert_eq!(h.controller.state(), PlaybackState::Paused);
    assert!(h.view.errors.is_empty());
    assert!(h.view.progress.is_empty());
}

#[test]
fn seek_relative_steps_from_current_position() {
    let mut h = Harness::new(&[("a.mp3", 200.0)]);
    h.controller.select_song(0, &mut h.view);
    h.engine.state().position = 50.0;
    h.controller.seek_relative(0.05, &mut h.view);
    let seeks = h.engine.state().seeks.clone();
    assert_eq!(seeks.len(), 1);
    assert!((seeks[0] - 60.0).abs() < 1e-9);
}

#[test]
fn load_failure_reports_and_falls_back_to_stopped() {
    let mut h = Harness::new(&[("good.mp3", 10.0), ("bad.mp3", 10.0)]);
    h.engine
        .state()
        .unloadable
        .insert(Path::new("bad.mp3").to_path_buf());

    h.controller.select_song(0, &mut h.view);
    h.controller.select_song(1, &mut h.view);

    assert_eq!(h.controller.state(), PlaybackState::Stopped);
    assert!(h.controller.current_track().is_none());
    assert_eq!(h.view.errors.len(), 1);
    assert!(h.view.errors[0].starts_with("cannot play track"));
    assert!(h.view.errors[0].contains("bad.mp3"));
    assert_eq!(h.view.now_playing, None);
    assert!(!h.view.playing);
    assert!(!h.controller.poller_running());
}

#[test]
fn duration_probe_failure_reports_and_stops() {
    let mut h = Harness::new(&[("a.mp3", 10.0)]);
    h.engine.state().durations.clear();

    h.controller.select_song(0, &mut h.view);
    assert_eq!(h.controller.state(), PlaybackState::Stopped);
    assert_eq!(h.view.errors.len(), 1);
    assert!(h.engine.state().loaded.is_none());
}

#[test]
fn duration_is_probed_once_per_track() {
    let mut h = Harness::new(&[("a.mp3", 10.0), ("b.mp3", 20.0)]);
    h.controller.select_song(0, &mut h.view);
    h.controller.next(&mut h.view);
    h.controller.next(&mut h.view);
    h.controller.select_song(0, &mut h.view);
    h.controller.toggle_play_pause(&mut h.view);
    h.controller.toggle_play_pause(&mut h.view);

    assert_eq!(h.engine.state().probes, 2);
    assert_eq!(h.controller.current_duration(), Some(10.0));
}

#[test]
fn out_of_range_selection_is_ignored() {
    let mut h = Harness::new(&[("a.mp3", 10.0)]);
    h.controller.select_song(5, &mut h.view);
    assert_eq!(h.controller.state(), PlaybackState::Stopped);
    assert!(h.engine.state().loaded.is_none());
}

#[test]
fn set_volume_clamps_and_forwards() {
    let mut h = Harness::new(&[("a.mp3", 10.0)]);
    h.controller.set_volume(0.3);
    assert!((h.engine.state().volume - 0.3).abs() < f32::EPSILON);
    h.controller.set_volume(4.0);
    assert_eq!(h.engine.state().volume, 1.0);
    assert_eq!(h.controller.volume(), 1.0);
    h.controller.set_volume(-1.0);
    assert_eq!(h.engine.state().volume, 0.0);
    assert_eq!(h.controller.state(), PlaybackState::Stopped);
}

#[test]
fn poller_progress_reaches_the_view_formatted() {
    let mut h = Harness::new(&[("a.mp3", 125.4)]);
    h.controller.select_song(0, &mut h.view);
    h.engine.state().position = 59.9;

    assert!(h.pump_until(|h| {
        h.view
            .progress
            .iter()
            .any(|(_, elapsed, _)| elapsed == "0:59")
    }));
    let (snap, _, total) = h.view.progress.last().cloned().unwrap();
    assert_eq!(total, "2:05");
    assert!(snap.fraction() > 0.0);
}

#[test]
fn stale_events_are_dropped() {
    let mut h = Harness::new(&[("a.mp3", 100.0), ("b.mp3", 100.0)]);
    h.controller.select_song(0, &mut h.view);
    h.controller.next(&mut h.view);

    // A finish from a poller that has been replaced must not stop playback.
    h.controller
        .handle_event(PlayerEvent::Finished { generation: 0 }, &mut h.view);
    h.controller.handle_event(
        PlayerEvent::Progress {
            generation: 0,
            snapshot: ProgressSnapshot::new(99.0, 100.0),
        },
        &mut h.view,
    );
    assert_eq!(h.controller.state(), PlaybackState::Playing);
    assert_eq!(h.current_name().as_deref(), Some("b.mp3"));
    assert!(
        !h.view
            .progress
            .iter()
            .any(|(s, _, _)| s.elapsed == 99.0)
    );
}

#[test]
fn track_end_stops_by_default() {
    let mut h = Harness::new(&[("a.mp3", 10.0), ("b.mp3", 10.0)]);
    h.controller.select_song(0, &mut h.view);
    h.engine.state().finished = true;

    assert!(h.pump_until(|h| h.controller.state() == PlaybackState::Stopped));
    assert!(!h.view.playing);
    assert_eq!(h.current_name().as_deref(), Some("a.mp3"));
    assert_eq!(h.view.now_playing.as_deref(), Some("a.mp3"));
    let (snap, _, _) = h.view.progress.last().cloned().unwrap();
    assert_eq!(snap.fraction(), 1.0);
}

#[test]
fn track_end_can_advance_to_next() {
    let mut h = Harness::with_settings(
        &[("a.mp3", 10.0), ("b.mp3", 10.0)],
        PlaybackSettings {
            poll_interval_ms: 10,
            on_track_end: TrackEndSetting::Next,
        },
    );
    h.controller.select_song(1, &mut h.view);
    h.engine.state().finished = true;

    assert!(h.pump_until(|h| h.controller.current_index() == Some(0)));
    assert_eq!(h.controller.state(), PlaybackState::Playing);
    assert_eq!(h.view.now_playing.as_deref(), Some("a.mp3"));
}

#[test]
fn poll_read_failure_transitions_to_stopped() {
    let mut h = Harness::new(&[("a.mp3", 10.0)]);
    h.engine.state().position_fails = true;
    h.controller.select_song(0, &mut h.view);

    assert!(h.pump_until(|h| h.controller.state() == PlaybackState::Stopped));
    assert_eq!(h.view.errors.len(), 1);
    assert!(h.view.errors[0].contains("device lost"));
}

#[test]
fn stop_unloads_and_halts_poller() {
    let mut h = Harness::new(&[("a.mp3", 10.0)]);
    h.controller.select_song(0, &mut h.view);
    h.controller.stop(&mut h.view);

    assert_eq!(h.controller.state(), PlaybackState::Stopped);
    assert!(h.controller.current_track().is_none());
    assert!(!h.controller.poller_running());
    assert!(h.engine.state().loaded.is_none());
    assert_eq!(h.view.now_playing, None);
}

#[test]
fn close_while_playing_halts_poller_within_a_tick() {
    let mut h = Harness::with_settings(
        &[("a.mp3", 10.0)],
        PlaybackSettings {
            poll_interval_ms: 100,
            ..PlaybackSettings::default()
        },
    );
    h.controller.select_song(0, &mut h.view);
    assert!(h.controller.poller_running());

    let started = Instant::now();
    h.controller.close(Duration::ZERO);
    assert!(started.elapsed() < Duration::from_millis(500));
    assert!(!h.controller.poller_running());
    assert_eq!(h.controller.state(), PlaybackState::Stopped);

    let s = h.engine.state();
    assert!(s.loaded.is_none());
    assert_eq!(s.stops, 1);
    drop(s);

    // With the poller joined, only already-queued events remain.
    while h.events.try_recv().is_ok() {}
    assert!(h.events.recv_timeout(Duration::from_millis(300)).is_err());
}

#[test]
fn close_fades_volume_out_before_stopping() {
    let mut h = Harness::new(&[("a.mp3", 10.0)]);
    h.controller.set_volume(0.8);
    h.controller.select_song(0, &mut h.view);
    h.controller.close(Duration::from_millis(40));

    let s = h.engine.state();
    assert!(s.volume.abs() < 1e-6);
    assert!(s.loaded.is_none());
}
