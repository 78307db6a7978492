//! Trajectory planning strategies and their shared plan representation

pub mod plan;
pub mod progress;
pub mod hybrid_astar;
pub mod rrt;

pub use plan::{Plan, PlanStep};
pub use progress::{ProgressPublisher, DEFAULT_PROGRESS_CAPACITY};
pub use hybrid_astar::{DiscreteState, HeuristicKind, HybridAStarConfig, HybridAStarPlanner};
pub use rrt::{RrtConfig, RrtPlanner};
