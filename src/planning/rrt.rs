//! Kinematic RRT trajectory planner
//!
//! Sampling-based alternative to Hybrid-A* satisfying the same planner
//! contract. The tree is grown by steering the motion model from the
//! nearest node toward random samples; exhausted actions are remembered
//! per node and never retried. Randomness is confined to this planner and
//! driven by a seeded generator for reproducibility.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Normal;

use crate::collision::BoundingSphereChecker;
use crate::common::{
    CollisionChecker, PlanningError, PlanningResult, Point2D, TrajectoryPlanner, VehicleState,
};
use crate::motion::MotionModel;
use crate::track::{Circuit, Goal, Track};
use crate::vehicle::{Action, ActionSet, VehicleParams};

use super::plan::{Plan, PlanStep};
use super::progress::{ProgressPublisher, DEFAULT_PROGRESS_CAPACITY};

/// Configuration for the RRT planner
#[derive(Debug, Clone)]
pub struct RrtConfig {
    /// Maximum tree-growing iterations before giving up
    pub max_iterations: usize,
    /// Probability of sampling near the pursued waypoint instead of
    /// uniformly over the track; must lie in [0, 1]
    pub goal_bias: f64,
    /// Duration each steering action is held when extending the tree [s]
    pub steer_duration: f64,
    /// Seed of the sampling generator
    pub seed: u64,
    /// Bound on buffered exploration-progress events
    pub progress_capacity: usize,
}

impl Default for RrtConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            goal_bias: 0.1,
            steer_duration: 0.5,
            seed: 0,
            progress_capacity: DEFAULT_PROGRESS_CAPACITY,
        }
    }
}

/// Tree node; the forbidden set records actions already tried from here
#[derive(Debug, Clone)]
struct RrtNode {
    state: VehicleState,
    parent: Option<usize>,
    action: Option<Action>,
    depth: u32,
    target_waypoint: usize,
    forbidden: HashSet<usize>,
}

/// Sampling-based trajectory planner over a track and its circuit
pub struct RrtPlanner {
    track: Arc<Track>,
    goals: Arc<Vec<Goal>>,
    actions: ActionSet,
    model: MotionModel,
    collision: BoundingSphereChecker,
    config: RrtConfig,
    rng: StdRng,
    progress: ProgressPublisher,
}

impl RrtPlanner {
    pub fn new(
        track: Arc<Track>,
        circuit: &Circuit,
        params: VehicleParams,
        actions: ActionSet,
        config: RrtConfig,
    ) -> PlanningResult<Self> {
        if !(0.0..=1.0).contains(&config.goal_bias) {
            return Err(PlanningError::InvalidParameter(format!(
                "goal bias must lie in [0, 1], got {}",
                config.goal_bias
            )));
        }
        if config.steer_duration <= 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "steer duration must be positive, got {}",
                config.steer_duration
            )));
        }
        if config.max_iterations == 0 {
            return Err(PlanningError::InvalidParameter(
                "iteration budget must be positive".to_string(),
            ));
        }
        let collision = BoundingSphereChecker::new(track.clone(), &params);
        let model = MotionModel::new(params)?;
        let rng = StdRng::seed_from_u64(config.seed);
        let progress = ProgressPublisher::new(config.progress_capacity);
        Ok(Self {
            track,
            goals: Arc::new(circuit.goals()),
            actions,
            model,
            collision,
            config,
            rng,
            progress,
        })
    }

    /// Subscribe to the exploration-progress stream
    pub fn subscribe_progress(&mut self) -> Receiver<VehicleState> {
        self.progress.subscribe()
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    fn sample_point(&mut self, pursued: &Goal) -> PlanningResult<Point2D> {
        if self.rng.gen::<f64>() < self.config.goal_bias {
            let spread = Normal::new(0.0, pursued.radius.max(0.5))
                .map_err(|e| PlanningError::InvalidParameter(e.to_string()))?;
            Ok(Point2D::new(
                pursued.position.x + self.rng.sample(spread),
                pursued.position.y + self.rng.sample(spread),
            ))
        } else {
            Ok(Point2D::new(
                self.rng.gen_range(0.0..self.track.width()),
                self.rng.gen_range(0.0..self.track.height()),
            ))
        }
    }

    /// Nearest tree node to the sample that still has untried actions
    fn nearest_expandable(&self, nodes: &[RrtNode], sample: &Point2D) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, node) in nodes.iter().enumerate() {
            if node.forbidden.len() >= self.actions.len() {
                continue;
            }
            let d = node.state.position.squared_distance(sample);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    fn reconstruct(&self, nodes: &[RrtNode], goal_index: usize) -> Plan {
        let mut steps = Vec::new();
        let mut current = Some(goal_index);
        while let Some(i) = current {
            let node = &nodes[i];
            steps.push(PlanStep {
                time: node.depth as f64 * self.config.steer_duration,
                state: node.state,
                action: node.action,
                target_waypoint: node.target_waypoint,
            });
            current = node.parent;
        }
        steps.reverse();
        Plan::new(steps)
    }
}

impl TrajectoryPlanner for RrtPlanner {
    fn find_optimal_plan(&mut self, initial: VehicleState) -> PlanningResult<Option<Plan>> {
        let mut start_target = 0;
        while start_target < self.goals.len()
            && self.goals[start_target].reached(&initial.position)
        {
            start_target += 1;
        }

        let mut nodes = vec![RrtNode {
            state: initial,
            parent: None,
            action: None,
            depth: 0,
            target_waypoint: start_target,
            forbidden: HashSet::new(),
        }];
        if start_target >= self.goals.len() {
            return Ok(Some(self.reconstruct(&nodes, 0)));
        }

        for iteration in 0..self.config.max_iterations {
            let pursued_phase = nodes
                .iter()
                .map(|n| n.target_waypoint)
                .max()
                .unwrap_or(start_target)
                .min(self.goals.len() - 1);
            let pursued = self.goals[pursued_phase];
            let sample = self.sample_point(&pursued)?;

            let Some(nearest) = self.nearest_expandable(&nodes, &sample) else {
                continue;
            };

            // greedy steering: among untried actions, the one whose
            // simulated endpoint lands closest to the sample
            let mut best: Option<(usize, Vec<(f64, VehicleState)>, f64)> = None;
            for (ai, action) in self.actions.actions().iter().enumerate() {
                if nodes[nearest].forbidden.contains(&ai) {
                    continue;
                }
                let motion = self.model.simulate(
                    &nodes[nearest].state,
                    action,
                    self.config.steer_duration,
                );
                let d = motion.last().unwrap().1.position.squared_distance(&sample);
                if best.as_ref().map_or(true, |(_, _, bd)| d < *bd) {
                    best = Some((ai, motion, d));
                }
            }
            let Some((chosen, motion, _)) = best else {
                continue;
            };
            // the chosen action is spent on this node either way
            nodes[nearest].forbidden.insert(chosen);

            let parent_target = nodes[nearest].target_waypoint;
            let mut collided = false;
            let mut reached = false;
            for (_, sub_state) in &motion {
                if self.collision.is_collision(sub_state) {
                    collided = true;
                    break;
                }
                if !reached
                    && parent_target < self.goals.len()
                    && self.goals[parent_target].reached(&sub_state.position)
                {
                    reached = true;
                }
            }
            if collided {
                continue;
            }

            let outcome = motion.last().unwrap().1;
            let child = RrtNode {
                state: outcome,
                parent: Some(nearest),
                action: Some(self.actions.actions()[chosen]),
                depth: nodes[nearest].depth + 1,
                target_waypoint: parent_target + usize::from(reached),
                forbidden: HashSet::new(),
            };
            self.progress.publish(&child.state);
            nodes.push(child);

            let index = nodes.len() - 1;
            if nodes[index].target_waypoint >= self.goals.len() {
                debug!(
                    "rrt: goal after {} iterations, {} tree nodes",
                    iteration + 1,
                    nodes.len()
                );
                return Ok(Some(self.reconstruct(&nodes, index)));
            }
        }

        debug!(
            "rrt: iteration budget exhausted with {} tree nodes: no plan",
            nodes.len()
        );
        Ok(None)
    }
}
