use std::env;
use std::path::{Path, PathBuf};

use ::config::{Config, ConfigError, Environment, File};

use super::schema::Settings;

const ENV_PREFIX: &str = "SPINDLE";
const CONFIG_PATH_VAR: &str = "SPINDLE_CONFIG_PATH";

impl Settings {
    /// Load settings: struct defaults, then the config file if it exists,
    /// then `SPINDLE__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(resolve_config_path().as_deref())
    }

    fn load_from(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Reject values the player cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        let volume = self.audio.volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(format!("audio.volume must be within [0, 1], got {volume}"));
        }
        if self.playback.poll_interval_ms == 0 {
            return Err("playback.poll_interval_ms must be >= 1".to_string());
        }
        let step = self.controls.seek_step_percent;
        if !(step > 0.0 && step <= 100.0) {
            return Err(format!(
                "controls.seek_step_percent must be within (0, 100], got {step}"
            ));
        }
        Ok(())
    }
}

/// `SPINDLE_CONFIG_PATH` when set, else the XDG location.
pub fn resolve_config_path() -> Option<PathBuf> {
    env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .or_else(default_config_path)
}

/// `$XDG_CONFIG_HOME/spindle/config.toml`, or `~/.config/spindle/config.toml`
/// when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .map(|dir| dir.join("spindle").join("config.toml"))
}
