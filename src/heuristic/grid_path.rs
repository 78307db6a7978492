//! Grid shortest-path heuristic
//!
//! Built once per planning query: an 8-connected best-first search over
//! step-quantized positions finds a coarse path visiting the waypoints in
//! order, the backtracked path is simplified by greedy visibility skipping,
//! and time-to-go queries reduce to a forward scan over the simplified
//! polyline with memoized suffix costs.

use std::sync::Arc;

use log::debug;

use crate::collision::BoundingSphereChecker;
use crate::common::{Heuristic, PlanningError, PlanningResult, Point2D, VehicleState};
use crate::search::{ClosedSet, EstimatedCost, OpenSet};
use crate::track::{Goal, Track};

use super::straight_line_time;

/// Quantized grid position plus waypoint phase.
///
/// The remaining-waypoint count lets the search revisit a grid cell once
/// per phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct GridKey {
    x: i32,
    y: i32,
    remaining: u32,
}

#[derive(Debug, Clone)]
struct GridNode {
    position: Point2D,
    target_waypoint: usize,
    parent: Option<usize>,
    time: f64,
}

#[derive(Debug, Clone, Copy)]
struct GridOpenNode {
    index: usize,
    time: f64,
    estimated_total: f64,
}

impl EstimatedCost for GridOpenNode {
    fn estimated_total_cost(&self) -> f64 {
        self.estimated_total
    }
}

/// One node of the simplified polyline
#[derive(Debug, Clone, Copy)]
struct PolylineNode {
    position: Point2D,
    target_waypoint: usize,
}

/// Time-to-go estimates from a coarse grid shortest path.
///
/// Queries scan forward over the immutable polyline and combine
/// straight-line time to the furthest visible node with its cached
/// cost-to-goal suffix.
#[derive(Debug)]
pub struct GridShortestPathHeuristic {
    track: Arc<Track>,
    nodes: Vec<PolylineNode>,
    cost_to_goal: Vec<f64>,
    max_speed: f64,
}

impl GridShortestPathHeuristic {
    /// Run the grid search and build the simplified polyline.
    ///
    /// Fails with [`PlanningError::HeuristicUnreachable`] when the waypoint
    /// sequence cannot be reached from `start`, which indicates a malformed
    /// map or start configuration the caller must fix.
    pub fn build(
        track: Arc<Track>,
        collision: &BoundingSphereChecker,
        goals: Arc<Vec<Goal>>,
        start: Point2D,
        step: f64,
        max_speed: f64,
    ) -> PlanningResult<Self> {
        if step <= 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "heuristic grid step must be positive, got {}",
                step
            )));
        }
        if max_speed <= 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "max speed must be positive, got {}",
                max_speed
            )));
        }

        let path = Self::search_grid_path(&track, collision, &goals, start, step, max_speed)?;
        let simplified = Self::simplify(&track, &path);
        let cost_to_goal = Self::suffix_costs(&simplified, max_speed);
        debug!(
            "grid heuristic: {} grid nodes simplified to {}",
            path.len(),
            simplified.len()
        );
        Ok(Self {
            track,
            nodes: simplified,
            cost_to_goal,
            max_speed,
        })
    }

    /// 8-connected best-first search over step-quantized positions
    fn search_grid_path(
        track: &Track,
        collision: &BoundingSphereChecker,
        goals: &[Goal],
        start: Point2D,
        step: f64,
        max_speed: f64,
    ) -> PlanningResult<Vec<PolylineNode>> {
        // consume waypoints already satisfied at the start, in order
        let mut start_target = 0;
        while start_target < goals.len() && goals[start_target].reached(&start) {
            start_target += 1;
        }

        let mut arena: Vec<GridNode> = Vec::new();
        let mut open: OpenSet<GridKey, GridOpenNode> = OpenSet::new();
        let mut closed: ClosedSet<GridKey> = ClosedSet::new();

        arena.push(GridNode {
            position: start,
            target_waypoint: start_target,
            parent: None,
            time: 0.0,
        });
        open.push(
            GridKey { x: 0, y: 0, remaining: (goals.len() - start_target) as u32 },
            GridOpenNode {
                index: 0,
                time: 0.0,
                estimated_total: straight_line_time(&start, start_target, goals, max_speed),
            },
        );

        const MOVES: [(i32, i32); 8] = [
            (1, 0),
            (0, 1),
            (-1, 0),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];

        while let Some((key, current)) = open.pop_most_promising() {
            let target = arena[current.index].target_waypoint;
            if target >= goals.len() {
                return Ok(Self::backtrack(&arena, current.index));
            }
            if !closed.insert(key) {
                continue;
            }

            for (dx, dy) in MOVES {
                let position = Point2D::new(
                    start.x + (key.x + dx) as f64 * step,
                    start.y + (key.y + dy) as f64 * step,
                );
                if collision.point_collides(&position) {
                    continue;
                }

                let new_target = if goals[target].reached(&position) {
                    target + 1
                } else {
                    target
                };
                let new_key = GridKey {
                    x: key.x + dx,
                    y: key.y + dy,
                    remaining: (goals.len() - new_target) as u32,
                };
                if closed.contains(&new_key) {
                    continue;
                }

                let move_len = if dx != 0 && dy != 0 {
                    step * std::f64::consts::SQRT_2
                } else {
                    step
                };
                let time = current.time + move_len / max_speed;

                if let Some(existing) = open.get(&new_key) {
                    if existing.time <= time {
                        continue;
                    }
                    arena.push(GridNode {
                        position,
                        target_waypoint: new_target,
                        parent: Some(current.index),
                        time,
                    });
                    let estimated_total =
                        time + straight_line_time(&position, new_target, goals, max_speed);
                    open.replace(
                        &new_key,
                        GridOpenNode { index: arena.len() - 1, time, estimated_total },
                    );
                } else {
                    arena.push(GridNode {
                        position,
                        target_waypoint: new_target,
                        parent: Some(current.index),
                        time,
                    });
                    let estimated_total =
                        time + straight_line_time(&position, new_target, goals, max_speed);
                    open.push(
                        new_key,
                        GridOpenNode { index: arena.len() - 1, time, estimated_total },
                    );
                }
            }
        }

        Err(PlanningError::HeuristicUnreachable { x: start.x, y: start.y })
    }

    fn backtrack(arena: &[GridNode], goal_index: usize) -> Vec<PolylineNode> {
        let mut path = Vec::new();
        let mut current = Some(goal_index);
        while let Some(i) = current {
            path.push(PolylineNode {
                position: arena[i].position,
                target_waypoint: arena[i].target_waypoint,
            });
            current = arena[i].parent;
        }
        path.reverse();
        path
    }

    /// Greedy visibility skipping.
    ///
    /// A node is kept only if it is the last one still in straight-line
    /// visibility of the last kept node, or if a waypoint-order change
    /// forces it.
    fn simplify(track: &Track, path: &[PolylineNode]) -> Vec<PolylineNode> {
        if path.len() <= 2 {
            return path.to_vec();
        }

        let mut kept = vec![path[0]];
        let mut anchor = 0;
        let mut i = 1;
        while i < path.len() {
            if path[i].target_waypoint != path[anchor].target_waypoint {
                // capture node: the waypoint disc is entered here
                kept.push(path[i]);
                anchor = i;
                i += 1;
            } else if track.line_of_sight(&path[anchor].position, &path[i].position) {
                i += 1;
            } else if i - 1 == anchor {
                // adjacent node occluded (diagonal corner cut): forced keep
                kept.push(path[i]);
                anchor = i;
                i += 1;
            } else {
                kept.push(path[i - 1]);
                anchor = i - 1;
            }
        }
        if kept.len() < 2
            || kept.last().unwrap().position != path.last().unwrap().position
        {
            kept.push(*path.last().unwrap());
        }
        kept
    }

    /// Memoized suffix sums of polyline travel time at max speed
    fn suffix_costs(nodes: &[PolylineNode], max_speed: f64) -> Vec<f64> {
        let mut cost = vec![0.0; nodes.len()];
        for i in (0..nodes.len().saturating_sub(1)).rev() {
            cost[i] =
                cost[i + 1] + nodes[i].position.distance(&nodes[i + 1].position) / max_speed;
        }
        cost
    }
}

impl Heuristic for GridShortestPathHeuristic {
    fn estimate_time_to_goal(&self, state: &VehicleState, next_waypoint: usize) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        // first polyline node still in (or past) the query's waypoint phase
        let start_idx = self
            .nodes
            .iter()
            .position(|n| n.target_waypoint >= next_waypoint)
            .unwrap_or(self.nodes.len() - 1);

        let mut furthest_visible = None;
        for j in start_idx..self.nodes.len() {
            if self
                .track
                .line_of_sight(&state.position, &self.nodes[j].position)
            {
                furthest_visible = Some(j);
            }
        }
        let j = furthest_visible.unwrap_or(start_idx);
        state.position.distance(&self.nodes[j].position) / self.max_speed + self.cost_to_goal[j]
    }
}
