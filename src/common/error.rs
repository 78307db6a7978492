//! Error types for track_planner

use std::fmt;

/// Main error type for planning operations
#[derive(Debug)]
pub enum PlanningError {
    /// Invalid parameter rejected at construction time
    InvalidParameter(String),
    /// The heuristic grid search could not reach the waypoint sequence
    /// from the given start position
    HeuristicUnreachable { x: f64, y: f64 },
    /// Malformed track file
    TrackFormat(String),
    /// I/O error
    IoError(std::io::Error),
}

impl fmt::Display for PlanningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanningError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            PlanningError::HeuristicUnreachable { x, y } => write!(
                f,
                "Heuristic error: waypoint sequence unreachable from ({}, {})",
                x, y
            ),
            PlanningError::TrackFormat(msg) => write!(f, "Track format error: {}", msg),
            PlanningError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for PlanningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlanningError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PlanningError {
    fn from(e: std::io::Error) -> Self {
        PlanningError::IoError(e)
    }
}

impl From<serde_json::Error> for PlanningError {
    fn from(e: serde_json::Error) -> Self {
        PlanningError::TrackFormat(e.to_string())
    }
}

/// Result type alias for planning operations
pub type PlanningResult<T> = Result<T, PlanningError>;
