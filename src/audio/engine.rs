//! The playback primitives the controller relies on.
//!
//! Implementations must be shareable across threads: the controller drives
//! the engine from the UI thread while the progress poller reads position and
//! busy status from its own thread. All methods take `&self`.

use std::path::Path;

use crate::error::Result;

pub trait AudioEngine: Send + Sync {
    /// Open and decode `path`, replacing whatever was loaded before.
    /// The track is left paused at position zero.
    fn load(&self, path: &Path) -> Result<()>;

    /// Start playing the loaded track from its current position.
    fn play(&self) -> Result<()>;

    fn pause(&self);

    fn resume(&self);

    /// Stop playback and unload the current track.
    fn stop(&self);

    /// Set the output volume; `volume` is expected in `[0, 1]`.
    fn set_volume(&self, volume: f32);

    /// Move the playhead of the loaded track to `seconds`.
    fn set_position(&self, seconds: f64) -> Result<()>;

    /// Elapsed playback position of the loaded track, in seconds.
    fn position(&self) -> Result<f64>;

    /// `true` while a track is loaded and has not played to its end.
    fn is_busy(&self) -> bool;

    /// Total length of the track at `path`, in seconds.
    fn duration(&self, path: &Path) -> Result<f64>;
}
