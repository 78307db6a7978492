//! Vehicle geometry and performance envelope

use crate::common::{PlanningError, PlanningResult};

/// Geometry and performance limits of the planned vehicle
#[derive(Debug, Clone)]
pub struct VehicleParams {
    /// Vehicle width [m]
    pub width: f64,
    /// Vehicle length, used as the kinematic wheelbase [m]
    pub length: f64,
    /// Minimum speed; negative allows reversing [m/s]
    pub min_speed: f64,
    /// Maximum forward speed [m/s]
    pub max_speed: f64,
    /// Maximum steering angle [rad]
    pub max_steering_angle: f64,
    /// Forward acceleration limit [m/s^2]
    pub acceleration: f64,
    /// Steering angle rate limit [rad/s]
    pub steering_rate: f64,
    /// Braking deceleration limit [m/s^2]
    pub braking_deceleration: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            width: 1.8,
            length: 4.0,
            min_speed: -5.0,
            max_speed: 20.0,
            max_steering_angle: 35.0_f64.to_radians(),
            acceleration: 8.0,
            steering_rate: 2.0,
            braking_deceleration: 12.0,
        }
    }
}

impl VehicleParams {
    /// Reject degenerate envelopes eagerly, before any search runs
    pub fn validate(&self) -> PlanningResult<()> {
        if self.width <= 0.0 || self.length <= 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "vehicle dimensions must be positive, got {}x{}",
                self.width, self.length
            )));
        }
        if self.max_speed <= 0.0 || self.min_speed >= self.max_speed {
            return Err(PlanningError::InvalidParameter(format!(
                "speed range [{}, {}] is invalid",
                self.min_speed, self.max_speed
            )));
        }
        if self.max_steering_angle <= 0.0
            || self.max_steering_angle >= std::f64::consts::FRAC_PI_2
        {
            return Err(PlanningError::InvalidParameter(format!(
                "max steering angle {} outside (0, pi/2)",
                self.max_steering_angle
            )));
        }
        if self.acceleration <= 0.0
            || self.steering_rate <= 0.0
            || self.braking_deceleration <= 0.0
        {
            return Err(PlanningError::InvalidParameter(
                "acceleration, steering rate and braking deceleration must be positive"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Radius of the bounding disc: half-diagonal of the bounding rectangle
    pub fn bounding_radius(&self) -> f64 {
        (self.width * self.width + self.length * self.length).sqrt() / 2.0
    }
}
