//! Playback state machine.
//!
//! The controller is owned by the UI thread and is the only place that
//! mutates the playlist cursor or the playback state. It drives the engine
//! directly and owns at most one `ProgressPoller`, whose events come back
//! through `handle_event`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::audio::{AudioEngine, PlaybackState, PlayerEvent, ProgressSnapshot};
use crate::config::{PlaybackSettings, TrackEndSetting};
use crate::error::PlayerError;
use crate::library::Track;
use crate::playlist::{Direction, Playlist};

use super::format::format_time;
use super::poller::ProgressPoller;
use super::view::PlayerView;

const FADE_STEPS: u64 = 20;

pub struct PlaybackController {
    engine: Arc<dyn AudioEngine>,
    events: Sender<PlayerEvent>,
    playlist: Playlist,
    state: PlaybackState,
    /// Playlist index of the track loaded into the engine.
    loaded: Option<usize>,
    durations: HashMap<PathBuf, f64>,
    poller: Option<ProgressPoller>,
    generation: u64,
    poll_interval: Duration,
    on_track_end: TrackEndSetting,
    volume: f32,
}

impl PlaybackController {
    pub fn new(
        engine: Arc<dyn AudioEngine>,
        events: Sender<PlayerEvent>,
        settings: &PlaybackSettings,
    ) -> Self {
        Self {
            engine,
            events,
            playlist: Playlist::new(),
            state: PlaybackState::Stopped,
            loaded: None,
            durations: HashMap::new(),
            poller: None,
            generation: 0,
            poll_interval: Duration::from_millis(settings.poll_interval_ms.max(1)),
            on_track_end: settings.on_track_end,
            volume: 1.0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Playlist index of the current track, if one is loaded.
    pub fn current_index(&self) -> Option<usize> {
        self.loaded
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.loaded.and_then(|i| self.playlist.get(i))
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Cached length of the current track, in seconds.
    pub fn current_duration(&self) -> Option<f64> {
        self.current_track()
            .and_then(|t| self.durations.get(&t.path))
            .copied()
    }

    pub fn add_tracks(&mut self, tracks: Vec<Track>, view: &mut dyn PlayerView) {
        if tracks.is_empty() {
            return;
        }
        debug!("adding {} track(s)", tracks.len());
        self.playlist.extend(tracks);
        view.on_playlist_changed(&self.playlist.names());
    }

    /// Load track `index` and start playing it from the beginning.
    pub fn select_song(&mut self, index: usize, view: &mut dyn PlayerView) {
        if !self.playlist.select_index(index) {
            warn!("ignoring selection of index {index}, playlist has {}", self.playlist.len());
            return;
        }
        self.halt_poller();

        let Some(track) = self.playlist.get(index).cloned() else {
            return;
        };

        if let Err(e) = self.start_track(&track) {
            self.fail(e, view);
            return;
        }

        info!("playing {}", track.path.display());
        self.loaded = Some(index);
        self.state = PlaybackState::Playing;
        self.spawn_poller();
        view.on_now_playing(Some(&track.display));
        view.on_play_state_changed(true);
    }

    fn start_track(&mut self, track: &Track) -> Result<(), PlayerError> {
        self.engine.load(&track.path)?;
        if !self.durations.contains_key(&track.path) {
            let total = self.engine.duration(&track.path)?;
            self.durations.insert(track.path.clone(), total);
        }
        self.engine.play()
    }

    pub fn toggle_play_pause(&mut self, view: &mut dyn PlayerView) {
        match self.state {
            PlaybackState::Playing => {
                self.engine.pause();
                self.halt_poller();
                self.state = PlaybackState::Paused;
                debug!("paused");
                view.on_play_state_changed(false);
            }
            PlaybackState::Paused => {
                self.engine.resume();
                self.state = PlaybackState::Playing;
                self.spawn_poller();
                debug!("resumed");
                view.on_play_state_changed(true);
            }
            PlaybackState::Stopped => {}
        }
    }

    pub fn next(&mut self, view: &mut dyn PlayerView) {
        self.step(Direction::Next, view);
    }

    pub fn previous(&mut self, view: &mut dyn PlayerView) {
        self.step(Direction::Previous, view);
    }

    fn step(&mut self, direction: Direction, view: &mut dyn PlayerView) {
        if let Some(index) = self.playlist.advance(direction) {
            self.select_song(index, view);
        }
    }

    /// Jump to `fraction` (0..1) of the current track. Engine refusals are
    /// logged and otherwise ignored; the playback state never changes here.
    pub fn seek(&mut self, fraction: f64, view: &mut dyn PlayerView) {
        if self.loaded.is_none() || !fraction.is_finite() {
            return;
        }
        let Some(total) = self.current_duration() else {
            return;
        };
        let position = fraction.clamp(0.0, 1.0) * total;
        match self.engine.set_position(position) {
            Ok(()) => {
                debug!("seeked to {position:.1}s");
                let snapshot = ProgressSnapshot::new(position, total);
                publish_progress(view, &snapshot);
            }
            Err(e) => debug!("seek to {position:.1}s ignored: {e}"),
        }
    }

    /// Move the current position by `delta` (a signed share of the track).
    pub fn seek_relative(&mut self, delta: f64, view: &mut dyn PlayerView) {
        let Some(total) = self.current_duration().filter(|t| *t > 0.0) else {
            return;
        };
        let Ok(position) = self.engine.position() else {
            return;
        };
        self.seek(position / total + delta, view);
    }

    pub fn set_volume(&mut self, volume: f32) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            self.volume
        };
        self.volume = volume;
        self.engine.set_volume(volume);
    }

    /// Stop playback and unload the current track.
    pub fn stop(&mut self, view: &mut dyn PlayerView) {
        self.halt_poller();
        self.engine.stop();
        let was_active = self.state != PlaybackState::Stopped || self.loaded.is_some();
        self.state = PlaybackState::Stopped;
        self.loaded = None;
        if was_active {
            view.on_now_playing(None);
            view.on_play_state_changed(false);
        }
    }

    /// Apply an event from the poller. Events from replaced pollers are dropped.
    pub fn handle_event(&mut self, event: PlayerEvent, view: &mut dyn PlayerView) {
        if event.generation() != self.generation {
            return;
        }
        match event {
            PlayerEvent::Progress { snapshot, .. } => {
                if self.state.is_playing() {
                    publish_progress(view, &snapshot);
                }
            }
            PlayerEvent::Finished { .. } => {
                self.halt_poller();
                if let Some(total) = self.current_duration() {
                    publish_progress(view, &ProgressSnapshot::new(total, total));
                }
                match self.on_track_end {
                    TrackEndSetting::Stop => {
                        debug!("track finished");
                        self.state = PlaybackState::Stopped;
                        view.on_play_state_changed(false);
                    }
                    TrackEndSetting::Next => self.next(view),
                }
            }
            PlayerEvent::Failed { reason, .. } => {
                self.fail(PlayerError::EngineUnavailable(reason), view);
            }
        }
    }

    /// Halt the poller, fade out over `fade_out` and release the track.
    /// The controller is left `Stopped` and never touches the engine again
    /// through a poller.
    pub fn close(&mut self, fade_out: Duration) {
        self.halt_poller();
        if self.state.is_playing() && !fade_out.is_zero() {
            let step = (fade_out / FADE_STEPS as u32).max(Duration::from_millis(1));
            for i in 1..=FADE_STEPS {
                let t = i as f32 / FADE_STEPS as f32;
                self.engine.set_volume(self.volume * (1.0 - t));
                thread::sleep(step);
            }
        }
        self.engine.stop();
        self.state = PlaybackState::Stopped;
        self.loaded = None;
        info!("playback closed");
    }

    fn fail(&mut self, err: PlayerError, view: &mut dyn PlayerView) {
        warn!("{err}");
        self.halt_poller();
        self.engine.stop();
        self.state = PlaybackState::Stopped;
        self.loaded = None;
        view.on_error(&format!("cannot play track: {err}"));
        view.on_now_playing(None);
        view.on_play_state_changed(false);
    }

    fn spawn_poller(&mut self) {
        self.halt_poller();
        let total = self.current_duration().unwrap_or(0.0);
        self.poller = Some(ProgressPoller::spawn(
            self.engine.clone(),
            total,
            self.poll_interval,
            self.generation,
            self.events.clone(),
        ));
    }

    /// Stop the running poller, if any, and retire its generation.
    fn halt_poller(&mut self) {
        if let Some(mut p) = self.poller.take() {
            p.stop();
        }
        self.generation = self.generation.wrapping_add(1);
    }

    #[cfg(test)]
    pub(crate) fn poller_running(&self) -> bool {
        self.poller.as_ref().is_some_and(ProgressPoller::is_running)
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Some(mut p) = self.poller.take() {
            p.stop();
        }
    }
}

fn publish_progress(view: &mut dyn PlayerView, snapshot: &ProgressSnapshot) {
    view.on_progress(
        snapshot,
        &format_time(snapshot.elapsed),
        &format_time(snapshot.total),
    );
}
