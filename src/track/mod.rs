//! Track and circuit model

pub mod occupancy;
pub mod circuit;
pub mod loader;

pub use occupancy::Track;
pub use circuit::{Circuit, Goal};
pub use loader::{load_track, parse_track};
