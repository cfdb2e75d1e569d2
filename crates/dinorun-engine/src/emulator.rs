//! Headless session runner.

use crate::world::World;

/// Default upper bound on simulated ticks per run (ten simulated minutes).
///
/// The world keeps accelerating, so every session ends in a crash
/// eventually; the limit only guards against pathological policies.
pub const DEFAULT_TICK_LIMIT: u32 = 36_000;

/// Runs complete sessions of the auto-runner without rendering.
#[derive(Debug, Clone, Copy)]
pub struct Emulator {
    tick_limit: u32,
}

impl Emulator {
    #[must_use]
    pub fn new(tick_limit: u32) -> Self {
        Self { tick_limit }
    }

    /// Plays `world` to completion, asking `decide` once per tick whether
    /// to jump. Returns the distance survived.
    pub fn run<F>(&self, mut world: World, mut decide: F) -> f32
    where
        F: FnMut(&World) -> bool,
    {
        for _ in 0..self.tick_limit {
            if decide(&world) {
                world.try_jump();
            }
            world.tick();
            if world.crashed() {
                break;
            }
        }
        world.distance_run()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_score() {
        let emulator = Emulator::default();
        let first = emulator.run(World::with_seed(9), |_| false);
        let second = emulator.run(World::with_seed(9), |_| false);
        assert_eq!(first, second);
        assert!(first > 0.0);
    }

    #[test]
    fn test_never_jumping_crashes_at_the_first_cactus() {
        let emulator = Emulator::new(100_000);
        let distance = emulator.run(World::with_seed(5), |_| false);
        // The first obstacle spawns 30 units out. A passive player ducks
        // under any leading birds but cannot get past the first cactus.
        assert!(distance >= 25.0);
        assert!(distance < 150.0);
    }

    #[test]
    fn test_tick_limit_bounds_the_session() {
        let emulator = Emulator::new(10);
        let distance = emulator.run(World::with_seed(5), |_| false);
        assert!(distance < 5.0);
    }
}
