//! Utility modules for track_planner

pub mod visualization;

pub use visualization::{colors, Visualizer};
