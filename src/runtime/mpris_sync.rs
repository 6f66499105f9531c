use crate::mpris::MprisHandle;
use crate::player::PlaybackController;

pub fn update_mpris(mpris: &MprisHandle, controller: &PlaybackController) {
    mpris.set_track_metadata(
        controller.current_index(),
        controller.current_track(),
        controller.current_duration(),
    );
    mpris.set_playback(controller.state());
    mpris.set_volume(controller.volume());
}
