//! Planned trajectories
//!
//! A plan is an ordered list of timed records; the first record is the
//! initial state and carries no action.

use crate::common::VehicleState;
use crate::motion::MotionModel;
use crate::vehicle::Action;

/// One record of a planned trajectory
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanStep {
    /// Time since the start of the plan [s]
    pub time: f64,
    /// Vehicle state at this time
    pub state: VehicleState,
    /// Action taken to reach this state; None for the initial record
    pub action: Option<Action>,
    /// Index of the waypoint pursued after this record
    pub target_waypoint: usize,
}

/// Ordered trajectory produced by one successful planning call
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    pub fn duration(&self) -> f64 {
        self.steps.last().map(|s| s.time).unwrap_or(0.0)
    }

    pub fn final_state(&self) -> Option<&VehicleState> {
        self.steps.last().map(|s| &s.state)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Re-expand every coarse step into its motion-model sub-steps.
    ///
    /// A pure transform: the input plan is unchanged, and records at the
    /// original step boundaries reproduce the original states exactly.
    /// Intermediate records keep pursuing the previous record's waypoint;
    /// the boundary record carries the step's own index.
    pub fn to_detailed(&self, model: &MotionModel) -> Plan {
        let mut steps = Vec::new();
        let Some(first) = self.steps.first() else {
            return Plan::new(steps);
        };
        steps.push(*first);

        for pair in self.steps.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let Some(action) = next.action else {
                steps.push(*next);
                continue;
            };
            let duration = next.time - prev.time;
            let sub = model.simulate(&prev.state, &action, duration);
            let count = sub.len();
            for (k, (t, state)) in sub.into_iter().enumerate() {
                let at_boundary = k + 1 == count;
                steps.push(PlanStep {
                    time: prev.time + t,
                    state,
                    action: Some(action),
                    target_waypoint: if at_boundary {
                        next.target_waypoint
                    } else {
                        prev.target_waypoint
                    },
                });
            }
        }
        Plan::new(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Point2D;
    use crate::vehicle::VehicleParams;

    fn model() -> MotionModel {
        MotionModel::new(VehicleParams::default()).unwrap()
    }

    /// Build a coarse two-action plan the way a planner would
    fn coarse_plan(model: &MotionModel) -> Plan {
        let dt = 0.5;
        let s0 = VehicleState::at_rest(Point2D::new(2.0, 2.0), 0.0);
        let a1 = Action::FULL_THROTTLE_STRAIGHT;
        let s1 = model.simulate(&s0, &a1, dt).last().unwrap().1;
        let a2 = Action::new(0.5, 0.5);
        let s2 = model.simulate(&s1, &a2, dt).last().unwrap().1;
        Plan::new(vec![
            PlanStep { time: 0.0, state: s0, action: None, target_waypoint: 0 },
            PlanStep { time: dt, state: s1, action: Some(a1), target_waypoint: 0 },
            PlanStep { time: 2.0 * dt, state: s2, action: Some(a2), target_waypoint: 1 },
        ])
    }

    #[test]
    fn test_detailed_checkpoints_match_exactly() {
        let model = model();
        let plan = coarse_plan(&model);
        let detailed = plan.to_detailed(&model);

        for step in &plan.steps {
            let checkpoint = detailed
                .steps
                .iter()
                .find(|d| d.time == step.time)
                .expect("boundary record missing from detailed plan");
            assert_eq!(checkpoint.state, step.state);
            assert_eq!(checkpoint.target_waypoint, step.target_waypoint);
        }
    }

    #[test]
    fn test_detailed_is_finer_and_ordered() {
        let model = model();
        let plan = coarse_plan(&model);
        let detailed = plan.to_detailed(&model);
        assert!(detailed.len() > plan.len());
        for w in detailed.steps.windows(2) {
            assert!(w[1].time > w[0].time);
        }
        assert_eq!(detailed.duration(), plan.duration());
    }

    #[test]
    fn test_detailed_targets_monotonic() {
        let model = model();
        let detailed = coarse_plan(&model).to_detailed(&model);
        for w in detailed.steps.windows(2) {
            assert!(w[1].target_waypoint >= w[0].target_waypoint);
            assert!(w[1].target_waypoint - w[0].target_waypoint <= 1);
        }
    }

    #[test]
    fn test_to_detailed_does_not_mutate_input() {
        let model = model();
        let plan = coarse_plan(&model);
        let copy = plan.clone();
        let _ = plan.to_detailed(&model);
        assert_eq!(plan, copy);
    }

    #[test]
    fn test_empty_plan() {
        let model = model();
        let plan = Plan::new(vec![]);
        assert!(plan.to_detailed(&model).is_empty());
        assert_eq!(plan.duration(), 0.0);
    }
}
