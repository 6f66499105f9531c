//! Settings schema and the loader that layers file and environment sources.

mod load;
mod schema;

pub use schema::*;
