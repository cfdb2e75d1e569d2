//! The evolved feed-forward jump network.
//!
//! A fixed topology with two hidden units and nine weights:
//!
//! ```text
//! hidden_a = cactus * w0 + bird * w1 + w2
//! hidden_b = bird * w3 + speed * w4 + w5
//! output   = hidden_a * w6 + hidden_b * w7 + w8
//! ```
//!
//! The runner jumps when the output activation reaches 0.5, boundary
//! included.

use crate::policy::JumpPolicy;

/// Number of weights in the fixed topology.
pub const WEIGHT_COUNT: usize = 9;

const JUMP_THRESHOLD: f32 = 0.5;

/// A jump policy driven by nine evolved weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkPolicy {
    weights: [f32; WEIGHT_COUNT],
}

impl NetworkPolicy {
    #[must_use]
    pub fn new(weights: [f32; WEIGHT_COUNT]) -> Self {
        Self { weights }
    }

    /// Builds a policy from a weight slice, typically the genes of an
    /// evolved genotype.
    pub fn from_weights(weights: &[f32]) -> Result<Self, WeightCountError> {
        let weights = weights
            .try_into()
            .map_err(|_| WeightCountError {
                found: weights.len(),
            })?;
        Ok(Self { weights })
    }

    #[must_use]
    pub fn weights(&self) -> &[f32; WEIGHT_COUNT] {
        &self.weights
    }

    fn activation(&self, nearest_cactus: f32, nearest_bird: f32, speed: f32) -> f32 {
        let [w0, w1, w2, w3, w4, w5, w6, w7, w8] = self.weights;
        let hidden_a = nearest_cactus * w0 + nearest_bird * w1 + w2;
        let hidden_b = nearest_bird * w3 + speed * w4 + w5;
        hidden_a * w6 + hidden_b * w7 + w8
    }
}

impl JumpPolicy for NetworkPolicy {
    fn should_jump(&self, nearest_cactus: f32, nearest_bird: f32, speed: f32) -> bool {
        self.activation(nearest_cactus, nearest_bird, speed) >= JUMP_THRESHOLD
    }
}

/// Weight slice whose length does not match the fixed topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("expected 9 network weights, found {found}")]
pub struct WeightCountError {
    pub found: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bias_only_network_jump_boundary() {
        let jump = NetworkPolicy::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.6]);
        assert!(jump.should_jump(40.0, 40.0, 15.0));

        let stay = NetworkPolicy::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.4]);
        assert!(!stay.should_jump(40.0, 40.0, 15.0));

        // The boundary activation itself jumps.
        let boundary = NetworkPolicy::new([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5]);
        assert!(boundary.should_jump(40.0, 40.0, 15.0));
    }

    #[test]
    fn test_network_reacts_to_cactus_distance() {
        // hidden_a = 1.0 - cactus / 10, forwarded unchanged to the output.
        let policy = NetworkPolicy::new([-0.1, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
        assert!(policy.should_jump(2.0, 80.0, 15.0));
        assert!(!policy.should_jump(40.0, 80.0, 15.0));
    }

    #[test]
    fn test_from_weights_rejects_wrong_count() {
        let error = NetworkPolicy::from_weights(&[0.0; 4]).unwrap_err();
        assert_eq!(error, WeightCountError { found: 4 });
        assert!(NetworkPolicy::from_weights(&[0.0; 9]).is_ok());
    }
}
