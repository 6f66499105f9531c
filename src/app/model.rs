//! Terminal view model.
//!
//! `App` holds what the UI renders: the playlist names, the cursor, the
//! now-playing label, the progress position with its two time labels, and
//! the last notification. The controller updates it through `PlayerView`.

use crate::audio::{PlaybackState, ProgressSnapshot};
use crate::player::PlayerView;

pub struct App {
    pub entries: Vec<String>,
    pub selected: usize,
    pub now_playing: Option<String>,
    pub playing: bool,
    /// Mirrored from the controller once per frame.
    pub playback: PlaybackState,
    /// Position slider value in `[0, 1]`.
    pub progress: f64,
    pub elapsed_label: String,
    pub total_label: String,
    pub volume: f32,
    /// Last error or notice, shown in the status line until replaced.
    pub status: Option<String>,
    pub follow_playback: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            selected: 0,
            now_playing: None,
            playing: false,
            playback: PlaybackState::Stopped,
            progress: 0.0,
            elapsed_label: "0:00".to_string(),
            total_label: "0:00".to_string(),
            volume: 1.0,
            status: None,
            follow_playback: true,
        }
    }
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return true if the playlist contains any tracks.
    pub fn has_tracks(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Set the selected index, clamped to the playlist.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx.min(self.entries.len().saturating_sub(1));
    }

    /// Move selection to the next track, wrapping to the first.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.entries.len();
        }
    }

    /// Move selection to the previous track, wrapping to the last.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            let len = self.entries.len();
            self.selected = (self.selected + len - 1) % len;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.entries.len().saturating_sub(1);
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    fn reset_progress(&mut self) {
        self.progress = 0.0;
        self.elapsed_label = "0:00".to_string();
        self.total_label = "0:00".to_string();
    }
}

impl PlayerView for App {
    fn on_playlist_changed(&mut self, names: &[String]) {
        self.entries = names.to_vec();
        self.set_selected(self.selected);
    }

    fn on_now_playing(&mut self, name: Option<&str>) {
        self.now_playing = name.map(str::to_string);
        self.reset_progress();
        if name.is_some() {
            self.clear_status();
        }
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot, elapsed: &str, total: &str) {
        self.progress = snapshot.fraction();
        self.elapsed_label = elapsed.to_string();
        self.total_label = total.to_string();
    }

    fn on_play_state_changed(&mut self, playing: bool) {
        self.playing = playing;
    }

    fn on_error(&mut self, message: &str) {
        self.set_status(message);
    }
}
