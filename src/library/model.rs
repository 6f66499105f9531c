use std::path::PathBuf;
use std::time::Duration;

/// A single playable audio file. Immutable once it has been added to a playlist.
#[derive(Clone, Debug, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Length from the container metadata, if the file could be probed.
    pub duration: Option<Duration>,
    pub display: String,
}

impl Track {
    /// A track with no metadata: title is the file stem, display is the file name.
    pub fn bare(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        let display = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| title.clone());
        Self {
            path,
            title,
            artist: None,
            album: None,
            duration: None,
            display,
        }
    }
}
