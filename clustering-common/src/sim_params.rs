use serde::{Deserialize, Serialize};
use crate::lattice::NUM_DIRECTIONS;

/// Per-replica parameters derived from the configuration, read on every simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    // Grid
    pub width: i32,
    pub length: i32,

    // Movement: probability of each direction relative to the previous one
    // (index 0 = straight on, index 4 = reverse). Normalised to sum 1.
    pub direction_weights: [f64; NUM_DIRECTIONS],

    // Pick/drop ramp bounds (a, b), 0 <= a <= b <= 1
    pub relu_low: f64,
    pub relu_high: f64,

    // Interaction
    pub similarity_threshold: u32,
    pub interaction_cooldown: u32,

    // Ants
    pub memory_size: usize,
    pub record_paths: bool,
}

impl SimParams {
    /// Uniform 8-way movement, no inertia.
    pub fn uniform_weights() -> [f64; NUM_DIRECTIONS] {
        [1.0 / NUM_DIRECTIONS as f64; NUM_DIRECTIONS]
    }
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            width: 100,
            length: 100,
            direction_weights: crate::config::normalize_weights(&crate::config::DEFAULT_DIRECTION_WEIGHTS)
                .unwrap_or_else(|_| Self::uniform_weights()),
            relu_low: 0.3,
            relu_high: 0.7,
            similarity_threshold: 0,
            interaction_cooldown: 20,
            memory_size: 20,
            record_paths: false,
        }
    }
}
