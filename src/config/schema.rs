use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/spindle/config.toml` or `~/.config/spindle/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `SPINDLE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub library: LibrarySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Initial output volume in `[0, 1]`.
    pub volume: f32,
    /// Fade-out duration when closing (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            volume: 1.0,
            quit_fade_out_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// How often the progress poller samples the engine (milliseconds).
    pub poll_interval_ms: u64,
    /// What happens when a track plays to its end.
    pub on_track_end: TrackEndSetting,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            on_track_end: TrackEndSetting::Stop,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackEndSetting {
    /// Stay on the finished track, stopped.
    Stop,
    /// Continue with the next track, wrapping around at the end.
    #[serde(alias = "advance", alias = "loop-all")]
    Next,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Share of the track to skip when pressing `H` / `L`, in percent.
    pub seek_step_percent: f64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_step_percent: 5.0,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Whether the cursor jumps to the track that starts playing.
    pub follow_playback: bool,
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            follow_playback: true,
            header_text: " spindle ".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackDisplayField {
    /// File name with extension.
    #[serde(alias = "filename", alias = "basename")]
    FileName,
    /// File name without extension.
    Stem,
    Title,
    Artist,
    Album,
    Path,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks when scanning directories.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,

    /// Which fields make up a playlist entry's display name.
    ///
    /// Example: ["artist", "title"] -> "Artist - Title"
    pub display_fields: Vec<TrackDisplayField>,
    /// Separator used to join `display_fields`.
    pub display_separator: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "wav".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
            display_fields: vec![TrackDisplayField::FileName],
            display_separator: " - ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is not set (`error`, `warn`, `info`, ...).
    pub level: String,
    /// Log file. Without one, logging stays off unless `RUST_LOG` is set.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}
