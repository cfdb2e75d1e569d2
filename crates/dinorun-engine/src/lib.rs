//! Headless simulation of the auto-runner world.
//!
//! The player runs at an ever-increasing speed toward cacti (jump over
//! them) and low-flying birds (stay on the ground). [`World`] holds the
//! simulation state and advances it one fixed timestep at a time;
//! [`Emulator`] drives a whole run from a jump policy and reports the
//! distance survived, which training uses as the fitness score.

pub use self::{emulator::*, world::*};

pub mod emulator;
pub mod world;
