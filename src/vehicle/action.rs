//! Steering/throttle commands and the precomputed action set

use crate::common::{PlanningError, PlanningResult};

/// One steering/throttle command.
///
/// Both components are normalized to [-1, 1]; negative throttle is braking.
/// Actions are compared by value for set-membership tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Action {
    pub throttle: f64,
    pub steering: f64,
}

impl Action {
    pub const fn new(throttle: f64, steering: f64) -> Self {
        Self { throttle, steering }
    }

    /// Hard braking, wheels straight
    pub const BRAKE: Action = Action::new(-1.0, 0.0);

    /// Full throttle, wheels straight
    pub const FULL_THROTTLE_STRAIGHT: Action = Action::new(1.0, 0.0);
}

/// Finite, precomputed list of actions the planners expand over.
///
/// Constructed once and shared read-only across all planning calls.
#[derive(Debug, Clone)]
pub struct ActionSet {
    actions: Vec<Action>,
}

impl ActionSet {
    /// Generate a quantized action grid plus the two canonical actions.
    ///
    /// `steering_levels` must be odd so a true zero-steering action exists;
    /// an even count is rejected here rather than discovered mid-search.
    pub fn generate(throttle_levels: usize, steering_levels: usize) -> PlanningResult<Self> {
        if throttle_levels < 2 {
            return Err(PlanningError::InvalidParameter(format!(
                "need at least 2 throttle levels, got {}",
                throttle_levels
            )));
        }
        if steering_levels % 2 == 0 {
            return Err(PlanningError::InvalidParameter(format!(
                "steering level count must be odd, got {}",
                steering_levels
            )));
        }

        let mut actions = Vec::with_capacity(throttle_levels * steering_levels + 2);
        for it in 0..throttle_levels {
            let throttle = -1.0 + 2.0 * it as f64 / (throttle_levels - 1) as f64;
            for is in 0..steering_levels {
                let steering = if steering_levels == 1 {
                    0.0
                } else {
                    -1.0 + 2.0 * is as f64 / (steering_levels - 1) as f64
                };
                actions.push(Action::new(throttle, steering));
            }
        }
        for canonical in [Action::BRAKE, Action::FULL_THROTTLE_STRAIGHT] {
            if !actions.contains(&canonical) {
                actions.push(canonical);
            }
        }
        Ok(Self { actions })
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_contains_canonical_actions() {
        let set = ActionSet::generate(3, 3).unwrap();
        assert!(set.actions().contains(&Action::BRAKE));
        assert!(set.actions().contains(&Action::FULL_THROTTLE_STRAIGHT));
    }

    #[test]
    fn test_generate_has_zero_steering() {
        let set = ActionSet::generate(2, 5).unwrap();
        assert!(set
            .actions()
            .iter()
            .any(|a| a.steering == 0.0 && a.throttle == 1.0));
    }

    #[test]
    fn test_canonical_actions_not_duplicated() {
        // a 3x3 grid already contains (-1, 0) and (1, 0)
        let set = ActionSet::generate(3, 3).unwrap();
        assert_eq!(set.len(), 9);
    }

    #[test]
    fn test_rejects_even_steering_count() {
        assert!(matches!(
            ActionSet::generate(3, 4),
            Err(PlanningError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_single_throttle_level() {
        assert!(ActionSet::generate(1, 3).is_err());
    }

    #[test]
    fn test_action_value_equality() {
        assert_eq!(Action::new(1.0, 0.0), Action::FULL_THROTTLE_STRAIGHT);
        assert_ne!(Action::new(0.5, 0.0), Action::FULL_THROTTLE_STRAIGHT);
    }
}
