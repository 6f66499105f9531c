//! Logger setup.
//!
//! The terminal belongs to the UI while the player runs, so records go to the
//! configured log file. Without a file, logging stays off unless `RUST_LOG`
//! asks for stderr output explicitly.

use std::fs::OpenOptions;

use log::info;

use crate::config::LoggingSettings;

pub fn init(settings: &LoggingSettings) {
    let env = env_logger::Env::default().default_filter_or(settings.level.as_str());

    if let Some(path) = &settings.file {
        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("spindle: cannot open log file {}: {e}", path.display());
                return;
            }
        };
        let installed = env_logger::Builder::from_env(env)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .try_init();
        if installed.is_ok() {
            info!("logging to {}", path.display());
        }
        return;
    }

    if std::env::var_os("RUST_LOG").is_some() {
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp_millis()
            .try_init();
    }
}
