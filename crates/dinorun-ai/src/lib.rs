//! Jump policies for the auto-runner.
//!
//! A [`JumpPolicy`] turns the three observable world inputs (nearest
//! cactus, nearest bird, speed) into a jump decision once per tick.
//! [`ThresholdPolicy`] is the hand-written baseline; [`NetworkPolicy`] is
//! the evolved feed-forward network whose nine weights the training crate
//! optimizes.

pub use self::{
    network::{NetworkPolicy, WEIGHT_COUNT, WeightCountError},
    policy::{JumpPolicy, ThresholdPolicy},
};

pub mod network;
pub mod policy;
