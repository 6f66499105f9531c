//! Audio subsystem: the engine contract, the rodio implementation and the
//! small types shared with the controller and the UI thread.

mod engine;
mod sink;
mod types;

pub use engine::AudioEngine;
pub use sink::AudioOutput;
pub use types::*;

#[cfg(test)]
pub(crate) mod fake;
