//! Vehicle description: geometry, performance envelope, and the action set

pub mod params;
pub mod action;

pub use params::VehicleParams;
pub use action::{Action, ActionSet};
