//! Track model and helpers to turn filesystem paths into playlist entries.

mod display;
mod model;
mod scan;

pub use model::Track;
pub use scan::collect_tracks;
