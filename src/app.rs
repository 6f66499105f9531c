//! View model for the terminal shell.

mod model;

pub use model::*;
