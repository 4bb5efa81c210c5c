//! Seeded randomness for NPC wandering.
//!
//! A [`DirectionPicker`] is created once per simulation with a fixed seed and
//! then drawn from for every random decision. It is never reseeded, so
//! several draws in the same tick are independent, and two pickers with the
//! same seed produce the same sequence. The generator state serializes, which
//! lets a snapshot resume the exact sequence.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// Deterministic source of random directions and chance rolls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionPicker {
    rng: Pcg32,
}

impl DirectionPicker {
    /// Create a picker seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// A uniformly random cardinal direction.
    pub fn choose(&mut self) -> Direction {
        Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())]
    }

    /// Roll a `percent`-in-100 chance. Values at or below 0 never succeed,
    /// values at or above 100 always do.
    pub fn chance(&mut self, percent: f64) -> bool {
        if percent.is_nan() {
            return false;
        }
        self.rng.gen_bool((percent / 100.0).clamp(0.0, 1.0))
    }
}

impl Default for DirectionPicker {
    fn default() -> Self {
        Self::new(0)
    }
}
