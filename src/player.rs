//! Playback controller, the progress poller it owns, and the contract it
//! uses to talk to the UI shell.

mod controller;
mod format;
mod poller;
mod view;

pub use controller::PlaybackController;
pub use view::PlayerView;

#[cfg(test)]
mod tests;
