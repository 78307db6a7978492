//! Cost-to-go estimation strategies
//!
//! Three implementations of the [`Heuristic`] trait, selected at planner
//! construction: the zero heuristic (degenerates the search to Dijkstra),
//! a straight-line-through-waypoints bound, and the grid shortest-path
//! heuristic built once per planning query.

pub mod grid_path;

pub use grid_path::GridShortestPathHeuristic;

use std::sync::Arc;

use itertools::Itertools;

use crate::common::{Heuristic, Point2D, VehicleState};
use crate::track::Goal;

/// Lower bound on the travel time from `position` through the remaining
/// waypoints at maximum speed.
///
/// Capture radii are subtracted from each leg, since reaching a disc
/// boundary suffices; this keeps the bound admissible.
pub(crate) fn straight_line_time(
    position: &Point2D,
    next_waypoint: usize,
    goals: &[Goal],
    max_speed: f64,
) -> f64 {
    if next_waypoint >= goals.len() {
        return 0.0;
    }
    let first = &goals[next_waypoint];
    let mut dist = (position.distance(&first.position) - first.radius).max(0.0);
    for (a, b) in goals[next_waypoint..].iter().tuple_windows() {
        dist += (a.position.distance(&b.position) - a.radius - b.radius).max(0.0);
    }
    dist / max_speed
}

/// Zero estimate: turns best-first search into uniform-cost (Dijkstra)
#[derive(Debug, Clone, Copy)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn estimate_time_to_goal(&self, _state: &VehicleState, _next_waypoint: usize) -> f64 {
        0.0
    }
}

/// Straight-line travel time through the remaining waypoints at max speed
#[derive(Debug, Clone)]
pub struct EuclideanHeuristic {
    goals: Arc<Vec<Goal>>,
    max_speed: f64,
}

impl EuclideanHeuristic {
    pub fn new(goals: Arc<Vec<Goal>>, max_speed: f64) -> Self {
        Self { goals, max_speed }
    }
}

impl Heuristic for EuclideanHeuristic {
    fn estimate_time_to_goal(&self, state: &VehicleState, next_waypoint: usize) -> f64 {
        straight_line_time(&state.position, next_waypoint, &self.goals, self.max_speed)
    }
}
