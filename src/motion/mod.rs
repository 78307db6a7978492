//! Sub-stepped kinematic bicycle motion model
//!
//! Integrates vehicle motion at a fixed minimum simulation interval and
//! yields every intermediate state, so callers can detect the first
//! collision or waypoint-capture event rather than only the final state.

use crate::common::{normalize_angle, PlanningError, PlanningResult, Point2D, VehicleState};
use crate::vehicle::{Action, VehicleParams};

/// Default minimum simulation interval [s]
pub const DEFAULT_MIN_STEP: f64 = 1.0 / 60.0;

/// Kinematic bicycle model with bounded convergence toward commanded
/// speed and steering targets
#[derive(Debug, Clone)]
pub struct MotionModel {
    params: VehicleParams,
    min_step: f64,
}

impl MotionModel {
    pub fn new(params: VehicleParams) -> PlanningResult<Self> {
        Self::with_min_step(params, DEFAULT_MIN_STEP)
    }

    pub fn with_min_step(params: VehicleParams, min_step: f64) -> PlanningResult<Self> {
        params.validate()?;
        if min_step <= 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "simulation step must be positive, got {}",
                min_step
            )));
        }
        Ok(Self { params, min_step })
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    pub fn min_step(&self) -> f64 {
        self.min_step
    }

    /// Forward-simulate one action for the given duration.
    ///
    /// Returns the time-ordered sequence of (elapsed time, state) pairs at
    /// every sub-step; the last pair lands exactly on `duration`. The start
    /// state itself is not included.
    pub fn simulate(
        &self,
        start: &VehicleState,
        action: &Action,
        duration: f64,
    ) -> Vec<(f64, VehicleState)> {
        let full_steps = (duration / self.min_step).floor() as usize;
        let remainder = duration - full_steps as f64 * self.min_step;
        let total = if remainder > 1e-9 {
            full_steps + 1
        } else {
            full_steps.max(1)
        };

        let mut out = Vec::with_capacity(total);
        let mut state = *start;
        let mut prev_t = 0.0;
        for k in 1..=total {
            // sub-step boundaries come from multiplication, not
            // accumulation, so identical durations replay identically
            let t = if k == total {
                duration
            } else {
                k as f64 * self.min_step
            };
            state = self.step(&state, action, t - prev_t);
            out.push((t, state));
            prev_t = t;
        }
        out
    }

    /// Integrate a single sub-step
    fn step(&self, s: &VehicleState, action: &Action, dt: f64) -> VehicleState {
        let p = &self.params;

        let target_speed = (action.throttle * p.max_speed).clamp(p.min_speed, p.max_speed);
        let dv = (target_speed - s.speed)
            .clamp(-p.braking_deceleration * dt, p.acceleration * dt);
        let speed = s.speed + dv;

        let target_steering = action.steering * p.max_steering_angle;
        let dsteer =
            (target_steering - s.steering).clamp(-p.steering_rate * dt, p.steering_rate * dt);
        let steering = s.steering + dsteer;

        let x = s.position.x + speed * s.heading.cos() * dt;
        let y = s.position.y + speed * s.heading.sin() * dt;
        let heading = normalize_angle(s.heading + speed / p.length * steering.tan() * dt);

        VehicleState::new(Point2D::new(x, y), heading, steering, speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> MotionModel {
        MotionModel::new(VehicleParams::default()).unwrap()
    }

    #[test]
    fn test_rejects_nonpositive_step() {
        assert!(MotionModel::with_min_step(VehicleParams::default(), 0.0).is_err());
        assert!(MotionModel::with_min_step(VehicleParams::default(), -0.1).is_err());
    }

    #[test]
    fn test_substep_times() {
        let m = model();
        let start = VehicleState::at_rest(Point2D::origin(), 0.0);
        let states = m.simulate(&start, &Action::FULL_THROTTLE_STRAIGHT, 0.5);
        assert_eq!(states.len(), 30);
        assert!((states.last().unwrap().0 - 0.5).abs() < 1e-12);
        // strictly increasing elapsed times
        for w in states.windows(2) {
            assert!(w[1].0 > w[0].0);
        }
    }

    #[test]
    fn test_partial_last_substep() {
        let m = model();
        let start = VehicleState::at_rest(Point2D::origin(), 0.0);
        let states = m.simulate(&start, &Action::FULL_THROTTLE_STRAIGHT, 0.025);
        assert_eq!(states.len(), 2);
        assert!((states[0].0 - 1.0 / 60.0).abs() < 1e-12);
        assert!((states[1].0 - 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_straight_motion_stays_on_axis() {
        let m = model();
        let start = VehicleState::at_rest(Point2D::origin(), 0.0);
        for (_, s) in m.simulate(&start, &Action::FULL_THROTTLE_STRAIGHT, 2.0) {
            assert!(s.position.y.abs() < 1e-12);
            assert!(s.heading.abs() < 1e-12);
        }
    }

    #[test]
    fn test_speed_converges_to_max() {
        let m = model();
        let start = VehicleState::at_rest(Point2D::origin(), 0.0);
        let states = m.simulate(&start, &Action::FULL_THROTTLE_STRAIGHT, 10.0);
        let final_speed = states.last().unwrap().1.speed;
        assert_eq!(final_speed, m.params().max_speed);
        // never exceeds the envelope on the way there
        for (_, s) in &states {
            assert!(s.speed <= m.params().max_speed + 1e-12);
        }
    }

    #[test]
    fn test_acceleration_limit() {
        let m = model();
        let start = VehicleState::at_rest(Point2D::origin(), 0.0);
        let states = m.simulate(&start, &Action::FULL_THROTTLE_STRAIGHT, 0.5);
        let (t, s) = states.last().unwrap();
        assert!(s.speed <= m.params().acceleration * t + 1e-9);
    }

    #[test]
    fn test_steering_rate_limit_and_saturation() {
        let m = model();
        let start = VehicleState::at_rest(Point2D::origin(), 0.0);
        let full_left = Action::new(1.0, 1.0);
        let states = m.simulate(&start, &full_left, 5.0);
        let max_angle = m.params().max_steering_angle;
        for (t, s) in &states {
            assert!(s.steering <= m.params().steering_rate * t + 1e-9);
            assert!(s.steering <= max_angle + 1e-12);
        }
        assert_eq!(states.last().unwrap().1.steering, max_angle);
    }

    #[test]
    fn test_braking_slows_faster_than_accelerating() {
        let m = model();
        let moving = VehicleState::new(Point2D::origin(), 0.0, 0.0, 10.0);
        let braked = m.simulate(&moving, &Action::BRAKE, 0.5);
        let dv = 10.0 - braked.last().unwrap().1.speed;
        assert!(dv > m.params().acceleration * 0.5 - 1e-9);
        assert!(dv <= m.params().braking_deceleration * 0.5 + 1e-9);
    }

    #[test]
    fn test_turning_curves_the_path() {
        let m = model();
        let start = VehicleState::new(Point2D::origin(), 0.0, 0.0, 5.0);
        let left = Action::new(0.5, 1.0);
        let states = m.simulate(&start, &left, 2.0);
        assert!(states.last().unwrap().1.position.y > 0.1);
    }

    #[test]
    fn test_simulation_deterministic() {
        let m = model();
        let start = VehicleState::new(Point2D::new(3.0, 4.0), 0.3, 0.1, 2.0);
        let action = Action::new(0.7, -0.4);
        let a = m.simulate(&start, &action, 1.3);
        let b = m.simulate(&start, &action, 1.3);
        assert_eq!(a, b);
    }
}
