//! Common traits defining interfaces for the planning components

use crate::common::error::PlanningResult;
use crate::common::types::VehicleState;
use crate::planning::Plan;

/// Trait for trajectory planning strategies.
///
/// Implementations search for a collision-free, kinematically feasible
/// trajectory that visits the circuit waypoints in order. `Ok(None)` is the
/// normal "no plan found" outcome, not an error; `Err` is reserved for
/// invalid configurations and fatal heuristic failures.
pub trait TrajectoryPlanner {
    /// Plan a trajectory from the given initial state
    fn find_optimal_plan(&mut self, initial: VehicleState) -> PlanningResult<Option<Plan>>;
}

/// Trait for collision detection strategies
pub trait CollisionChecker {
    /// Check whether the vehicle collides with the track in this state
    fn is_collision(&self, state: &VehicleState) -> bool;
}

/// Trait for cost-to-go estimation strategies.
///
/// Estimates must never overestimate the true remaining time to satisfy
/// all remaining waypoints, or the search loses its optimality guarantee.
pub trait Heuristic {
    /// Estimated remaining time [s] to capture all waypoints from
    /// `next_waypoint` onward, starting at `state`
    fn estimate_time_to_goal(&self, state: &VehicleState, next_waypoint: usize) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::Point2D;

    struct DummyPlanner;

    impl TrajectoryPlanner for DummyPlanner {
        fn find_optimal_plan(&mut self, _initial: VehicleState) -> PlanningResult<Option<Plan>> {
            Ok(None)
        }
    }

    #[test]
    fn test_trajectory_planner_trait() {
        let mut planner = DummyPlanner;
        let initial = VehicleState::at_rest(Point2D::origin(), 0.0);
        let result = planner.find_optimal_plan(initial);
        assert!(matches!(result, Ok(None)));
    }
}
