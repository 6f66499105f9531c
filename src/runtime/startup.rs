use std::path::PathBuf;

use log::info;

use crate::app::App;
use crate::config;
use crate::library::collect_tracks;
use crate::player::PlaybackController;

/// Apply the configured volume and seed the playlist from launch arguments.
pub fn seed_playlist(
    controller: &mut PlaybackController,
    app: &mut App,
    paths: &[PathBuf],
    settings: &config::Settings,
) {
    controller.set_volume(settings.audio.volume);
    app.volume = controller.volume();

    if paths.is_empty() {
        return;
    }
    let tracks = collect_tracks(paths, &settings.library);
    info!(
        "{} track(s) from {} launch argument(s)",
        tracks.len(),
        paths.len()
    );
    controller.add_tracks(tracks, app);
}
