//! Error taxonomy for the playback engine and controller.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// The file is missing, unsupported or cannot be decoded for playback.
    #[error("cannot load {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// Probing the total duration of a track failed.
    #[error("cannot read duration of {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// The requested position is outside the decodable range, or the engine
    /// has nothing to seek in.
    #[error("seek failed: {0}")]
    Seek(String),

    /// The audio output could not be opened, or no track is loaded.
    #[error("audio engine unavailable: {0}")]
    EngineUnavailable(String),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
