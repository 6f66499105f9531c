use crate::audio::ProgressSnapshot;

/// What the controller tells the UI shell. All calls happen on the UI thread.
pub trait PlayerView {
    /// The playlist changed; `names` are the display names in order.
    fn on_playlist_changed(&mut self, names: &[String]);

    /// A track started (`Some`) or playback was stopped and unloaded (`None`).
    fn on_now_playing(&mut self, name: Option<&str>);

    /// New playback position with its formatted `elapsed` and `total` labels.
    fn on_progress(&mut self, snapshot: &ProgressSnapshot, elapsed: &str, total: &str);

    fn on_play_state_changed(&mut self, playing: bool);

    /// A non-fatal failure worth showing to the user.
    fn on_error(&mut self, message: &str);
}
