//! track_planner - motion planning for a wheeled vehicle on 2D tracks
//!
//! This crate plans collision-free, kinematically feasible trajectories
//! toward an ordered sequence of waypoints: a generic best-first search
//! engine, its Hybrid-A* instantiation over a discretized vehicle state
//! space, a grid shortest-path heuristic with visibility simplification,
//! and the motion/collision primitives the search depends on.

// Core modules
pub mod common;
pub mod utils;

// Planning components
pub mod track;
pub mod vehicle;
pub mod motion;
pub mod collision;
pub mod search;
pub mod heuristic;
pub mod planning;

// Re-export common types for convenience
pub use common::{normalize_angle, Point2D, VehicleState};
pub use common::{CollisionChecker, Heuristic, TrajectoryPlanner};
pub use common::{PlanningError, PlanningResult};
pub use planning::{Plan, PlanStep};
