//! Search configuration

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::defaults::{DEFAULT_ITERATIONS, DEFAULT_PERTURBATION_LEVEL};

/// Configuration for the iterated local search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Number of perturb-and-refine rounds
    pub iterations: usize,
    /// Random swaps applied per round
    pub perturbation_level: usize,
    /// Fixed seed for reproducible runs; entropy-seeded when `None`
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            perturbation_level: DEFAULT_PERTURBATION_LEVEL,
            seed: None,
        }
    }
}

impl SolverConfig {
    pub fn new(iterations: usize, perturbation_level: usize) -> Self {
        Self {
            iterations,
            perturbation_level,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Short budget for interactive use
    pub fn fast() -> Self {
        Self::new(200, DEFAULT_PERTURBATION_LEVEL)
    }

    /// Long budget for background processing
    pub fn quality() -> Self {
        Self::new(10_000, DEFAULT_PERTURBATION_LEVEL)
    }

    /// Random source for perturbation
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
