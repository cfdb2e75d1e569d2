//! World state: obstacles, scroll speed, and the player's jump arc.

use std::collections::VecDeque;

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

/// Fixed simulation timestep, in seconds.
pub const TICK_SECONDS: f32 = 1.0 / 60.0;

/// How far ahead of the player obstacles are spawned and visible.
///
/// Also the sentinel returned by [`WorldQuery::nearest_obstacle`] when no
/// obstacle of the requested kind is in sight.
pub const SIGHT_RANGE: f32 = 80.0;

const BASE_SPEED: f32 = 15.0;
const ACCELERATION: f32 = 0.12;
const GRAVITY: f32 = 20.0;
const JUMP_VELOCITY: f32 = 8.0;

const PLAYER_HALF_WIDTH: f32 = 0.4;
const PLAYER_HEIGHT: f32 = 1.1;
const OBSTACLE_HALF_WIDTH: f32 = 0.4;
const CACTUS_HEIGHT: f32 = 0.9;
// The bird band starts above a grounded player, so only a jump can hit it.
const BIRD_LOW: f32 = 1.3;
const BIRD_HIGH: f32 = 2.0;

const FIRST_OBSTACLE_DISTANCE: f32 = 30.0;
const MIN_GAP: f32 = 14.0;
const MAX_GAP: f32 = 26.0;
const BIRD_RATE: f64 = 0.25;

/// Kinds of obstacle the runner can meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleKind {
    Cactus,
    Bird,
}

/// One obstacle on the track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Distance from the player along the forward axis. Negative once
    /// passed.
    pub distance: f32,
}

/// Read-only view of the world, the inputs a jump policy may observe.
pub trait WorldQuery {
    /// Distance to the nearest obstacle of `kind` ahead of the player, or
    /// [`SIGHT_RANGE`] if none is visible.
    fn nearest_obstacle(&self, kind: ObstacleKind) -> f32;

    /// Current scroll speed, in units per second.
    fn speed(&self) -> f32;
}

/// The auto-runner world for one session.
#[derive(Debug, Clone)]
pub struct World {
    rng: Pcg32,
    obstacles: VecDeque<Obstacle>,
    speed: f32,
    distance_run: f32,
    player_height: f32,
    player_velocity: f32,
    crashed: bool,
}

impl World {
    /// Creates a world seeded from the operating system.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(Pcg32::from_os_rng())
    }

    /// Creates a world with a deterministic obstacle course.
    ///
    /// The same seed always produces the same course, so two runs with the
    /// same policy score identically.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(Pcg32::seed_from_u64(seed))
    }

    fn with_rng(rng: Pcg32) -> Self {
        let mut world = Self {
            rng,
            obstacles: VecDeque::new(),
            speed: BASE_SPEED,
            distance_run: 0.0,
            player_height: 0.0,
            player_velocity: 0.0,
            crashed: false,
        };
        let kind = world.roll_kind();
        world.obstacles.push_back(Obstacle {
            kind,
            distance: FIRST_OBSTACLE_DISTANCE,
        });
        world.replenish_obstacles();
        world
    }

    fn roll_kind(&mut self) -> ObstacleKind {
        if self.rng.random_bool(BIRD_RATE) {
            ObstacleKind::Bird
        } else {
            ObstacleKind::Cactus
        }
    }

    fn replenish_obstacles(&mut self) {
        let mut frontier = self
            .obstacles
            .back()
            .map_or(0.0, |obstacle| obstacle.distance);
        while frontier < SIGHT_RANGE {
            frontier += self.rng.random_range(MIN_GAP..=MAX_GAP);
            let kind = self.roll_kind();
            self.obstacles.push_back(Obstacle {
                kind,
                distance: frontier,
            });
        }
    }

    /// Advances the simulation by one fixed timestep.
    ///
    /// Does nothing once the player has crashed.
    pub fn tick(&mut self) {
        if self.crashed {
            return;
        }

        self.speed += ACCELERATION * TICK_SECONDS;
        let step = self.speed * TICK_SECONDS;
        self.distance_run += step;
        for obstacle in &mut self.obstacles {
            obstacle.distance -= step;
        }
        while self
            .obstacles
            .front()
            .is_some_and(|obstacle| obstacle.distance < -(OBSTACLE_HALF_WIDTH + PLAYER_HALF_WIDTH))
        {
            self.obstacles.pop_front();
        }
        self.replenish_obstacles();

        if self.player_height > 0.0 || self.player_velocity > 0.0 {
            self.player_velocity -= GRAVITY * TICK_SECONDS;
            self.player_height =
                (self.player_height + self.player_velocity * TICK_SECONDS).max(0.0);
            if self.player_height == 0.0 && self.player_velocity < 0.0 {
                self.player_velocity = 0.0;
            }
        }

        if self.collides() {
            self.crashed = true;
        }
    }

    /// Starts a jump if the player is on the ground.
    ///
    /// Mirrors player input: requesting a jump mid-air has no effect.
    pub fn try_jump(&mut self) {
        if !self.crashed && self.player_height == 0.0 && self.player_velocity <= 0.0 {
            self.player_velocity = JUMP_VELOCITY;
        }
    }

    fn collides(&self) -> bool {
        self.obstacles.iter().any(|obstacle| {
            if obstacle.distance.abs() > OBSTACLE_HALF_WIDTH + PLAYER_HALF_WIDTH {
                return false;
            }
            let bottom = self.player_height;
            let top = self.player_height + PLAYER_HEIGHT;
            match obstacle.kind {
                ObstacleKind::Cactus => bottom < CACTUS_HEIGHT,
                ObstacleKind::Bird => bottom < BIRD_HIGH && top > BIRD_LOW,
            }
        })
    }

    /// Whether the player has hit an obstacle.
    #[must_use]
    pub fn crashed(&self) -> bool {
        self.crashed
    }

    /// Total distance survived so far, in world units.
    #[must_use]
    pub fn distance_run(&self) -> f32 {
        self.distance_run
    }

    /// Player height above the ground.
    #[must_use]
    pub fn player_height(&self) -> f32 {
        self.player_height
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldQuery for World {
    fn nearest_obstacle(&self, kind: ObstacleKind) -> f32 {
        self.obstacles
            .iter()
            .filter(|obstacle| obstacle.kind == kind && obstacle.distance > 0.0)
            .map(|obstacle| obstacle.distance)
            .fold(SIGHT_RANGE, f32::min)
    }

    fn speed(&self) -> f32 {
        self.speed
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;

    use super::*;

    fn world_with(obstacles: Vec<Obstacle>) -> World {
        World {
            rng: Pcg32::seed_from_u64(0),
            obstacles: obstacles.into(),
            speed: BASE_SPEED,
            distance_run: 0.0,
            player_height: 0.0,
            player_velocity: 0.0,
            crashed: false,
        }
    }

    #[test]
    fn test_nearest_obstacle_filters_by_kind() {
        let world = world_with(vec![
            Obstacle {
                kind: ObstacleKind::Bird,
                distance: 12.0,
            },
            Obstacle {
                kind: ObstacleKind::Cactus,
                distance: 20.0,
            },
        ]);
        assert_eq!(world.nearest_obstacle(ObstacleKind::Cactus), 20.0);
        assert_eq!(world.nearest_obstacle(ObstacleKind::Bird), 12.0);
    }

    #[test]
    fn test_nearest_obstacle_sentinel_when_none_in_sight() {
        let world = world_with(vec![Obstacle {
            kind: ObstacleKind::Cactus,
            distance: 20.0,
        }]);
        assert_eq!(world.nearest_obstacle(ObstacleKind::Bird), SIGHT_RANGE);
    }

    #[test]
    fn test_passed_obstacles_are_ignored() {
        let world = world_with(vec![Obstacle {
            kind: ObstacleKind::Cactus,
            distance: -1.5,
        }]);
        assert_eq!(world.nearest_obstacle(ObstacleKind::Cactus), SIGHT_RANGE);
    }

    #[test]
    fn test_tick_advances_distance_and_speed() {
        let mut world = World::with_seed(3);
        world.tick();
        assert!(world.distance_run() > 0.0);
        assert!(world.speed() > BASE_SPEED);
        // The first obstacle spawns well outside collision range.
        assert!(!world.crashed());
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut world = World::with_seed(3);
        world.try_jump();
        world.tick();
        assert!(world.player_height() > 0.0);

        let airborne_velocity = world.player_velocity;
        world.try_jump();
        assert_eq!(world.player_velocity, airborne_velocity);
    }

    #[test]
    fn test_jump_arc_returns_to_ground() {
        let mut world = world_with(Vec::new());
        world.try_jump();
        let mut peak = 0.0f32;
        for _ in 0..120 {
            world.tick();
            peak = peak.max(world.player_height());
        }
        assert!(peak > CACTUS_HEIGHT);
        assert_eq!(world.player_height(), 0.0);
    }

    #[test]
    fn test_grounded_player_hits_close_cactus() {
        let mut world = world_with(vec![Obstacle {
            kind: ObstacleKind::Cactus,
            distance: 0.5,
        }]);
        world.tick();
        assert!(world.crashed());
    }

    #[test]
    fn test_grounded_player_passes_under_bird() {
        let mut world = world_with(vec![Obstacle {
            kind: ObstacleKind::Bird,
            distance: 0.5,
        }]);
        world.tick();
        assert!(!world.crashed());
    }

    #[test]
    fn test_crashed_world_stops_advancing() {
        let mut world = world_with(vec![Obstacle {
            kind: ObstacleKind::Cactus,
            distance: 0.5,
        }]);
        world.tick();
        assert!(world.crashed());
        let frozen = world.distance_run();
        world.tick();
        assert_eq!(world.distance_run(), frozen);
    }
}
