//! Common value types for track_planner

use nalgebra::Vector2;

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        self.squared_distance(other).sqrt()
    }

    pub fn squared_distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<Vector2<f64>> for Point2D {
    fn from(v: Vector2<f64>) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

/// Normalize an angle to [-pi, pi]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle;
    while a > std::f64::consts::PI {
        a -= 2.0 * std::f64::consts::PI;
    }
    while a < -std::f64::consts::PI {
        a += 2.0 * std::f64::consts::PI;
    }
    a
}

/// Normalize an angle to [0, 2*pi)
pub fn normalize_angle_positive(angle: f64) -> f64 {
    let tau = 2.0 * std::f64::consts::PI;
    let a = angle % tau;
    if a < 0.0 {
        a + tau
    } else {
        a
    }
}

/// Kinematic state of the vehicle.
///
/// Immutable value: states are produced by the motion model and never
/// mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    /// Position of the vehicle center [m]
    pub position: Point2D,
    /// Heading angle [rad]
    pub heading: f64,
    /// Current steering angle [rad]
    pub steering: f64,
    /// Scalar forward speed [m/s]
    pub speed: f64,
}

impl VehicleState {
    pub fn new(position: Point2D, heading: f64, steering: f64, speed: f64) -> Self {
        Self { position, heading, steering, speed }
    }

    /// State at rest at the given position with the given heading
    pub fn at_rest(position: Point2D, heading: f64) -> Self {
        Self::new(position, heading, 0.0, 0.0)
    }
}
