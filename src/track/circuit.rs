//! Circuit definition: ordered waypoints with capture radii

use crate::common::Point2D;

/// A goal position with a capture radius
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Goal {
    pub position: Point2D,
    pub radius: f64,
}

impl Goal {
    pub fn new(position: Point2D, radius: f64) -> Self {
        Self { position, radius }
    }

    /// Disc-containment capture test
    pub fn reached(&self, p: &Point2D) -> bool {
        self.position.squared_distance(p) <= self.radius * self.radius
    }
}

/// Ordered waypoint sequence the vehicle must visit
#[derive(Debug, Clone)]
pub struct Circuit {
    /// Start position of the vehicle
    pub start: Point2D,
    /// Capture radius shared by all waypoints [m]
    pub waypoint_radius: f64,
    /// Waypoint positions in visiting order
    pub waypoints: Vec<Point2D>,
}

impl Circuit {
    pub fn new(start: Point2D, waypoint_radius: f64, waypoints: Vec<Point2D>) -> Self {
        Self { start, waypoint_radius, waypoints }
    }

    /// The waypoints as capture goals, in visiting order
    pub fn goals(&self) -> Vec<Goal> {
        self.waypoints
            .iter()
            .map(|&p| Goal::new(p, self.waypoint_radius))
            .collect()
    }
}
