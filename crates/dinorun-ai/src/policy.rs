//! The jump decision interface and the baseline policy.

use dinorun_engine::{ObstacleKind, WorldQuery};

/// Distance at which the baseline policy starts a jump.
pub const DEFAULT_TRIGGER_DISTANCE: f32 = 10.0;

/// Decides once per tick whether the runner should jump.
pub trait JumpPolicy {
    /// `nearest_cactus` and `nearest_bird` are forward distances as
    /// reported by [`WorldQuery::nearest_obstacle`]; `speed` is the current
    /// world speed.
    fn should_jump(&self, nearest_cactus: f32, nearest_bird: f32, speed: f32) -> bool;

    /// Reads the three inputs from `world` and applies
    /// [`JumpPolicy::should_jump`].
    fn decide(&self, world: &dyn WorldQuery) -> bool {
        self.should_jump(
            world.nearest_obstacle(ObstacleKind::Cactus),
            world.nearest_obstacle(ObstacleKind::Bird),
            world.speed(),
        )
    }
}

/// Jump whenever the nearest cactus is closer than a fixed trigger
/// distance.
///
/// Ignores birds and speed entirely; kept as the baseline evolved policies
/// are compared against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPolicy {
    pub trigger_distance: f32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            trigger_distance: DEFAULT_TRIGGER_DISTANCE,
        }
    }
}

impl JumpPolicy for ThresholdPolicy {
    fn should_jump(&self, nearest_cactus: f32, _nearest_bird: f32, _speed: f32) -> bool {
        nearest_cactus < self.trigger_distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubWorld {
        cactus: f32,
        bird: f32,
        speed: f32,
    }

    impl WorldQuery for StubWorld {
        fn nearest_obstacle(&self, kind: ObstacleKind) -> f32 {
            match kind {
                ObstacleKind::Cactus => self.cactus,
                ObstacleKind::Bird => self.bird,
            }
        }

        fn speed(&self) -> f32 {
            self.speed
        }
    }

    #[test]
    fn test_threshold_policy_triggers_on_near_cactus() {
        let policy = ThresholdPolicy::default();
        assert!(policy.should_jump(9.9, 80.0, 15.0));
        assert!(!policy.should_jump(10.0, 80.0, 15.0));
    }

    #[test]
    fn test_decide_reads_world_inputs() {
        let policy = ThresholdPolicy {
            trigger_distance: 5.0,
        };
        let near = StubWorld {
            cactus: 3.0,
            bird: 80.0,
            speed: 15.0,
        };
        assert!(policy.decide(&near));

        let far = StubWorld {
            cactus: 40.0,
            bird: 2.0,
            speed: 15.0,
        };
        assert!(!policy.decide(&far));
    }
}
