//! Iterated local search over an initial route
//!
//! Refine the seed to a 2-opt optimum, then for a fixed budget perturb the
//! best route, refine again and keep the result only if it is feasible and
//! strictly cheaper. No worse solutions are ever accepted.

use rand::Rng;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::config::SolverConfig;
use super::evaluator::{evaluate, Cost};
use super::perturbation::perturb;
use super::problem::{Minutes, Problem, Route};
use super::two_opt::refine;

/// Counters gathered during a search run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    pub iterations: usize,
    pub improvements: usize,
    /// Cost of the refined initial route
    pub initial_cost: Minutes,
}

/// Best feasible route found and its travel cost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub route: Route,
    pub cost: Minutes,
    pub stats: SearchStats,
}

/// Greedy iterated local search driver
pub struct RouteOptimizer {
    config: SolverConfig,
    cancel: Option<CancellationToken>,
}

impl RouteOptimizer {
    pub fn new(config: SolverConfig) -> Self {
        Self { config, cancel: None }
    }

    /// Stop iterating once `token` is cancelled, keeping the best route so far.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |token| token.is_cancelled())
    }

    /// Improve `initial` within the iteration budget.
    ///
    /// Returns `None` when there is no initial route or when the refined
    /// initial route is infeasible.
    pub fn solve<R: Rng + ?Sized>(
        &self,
        problem: &Problem,
        initial: Option<&Route>,
        rng: &mut R,
    ) -> Option<Solution> {
        let initial = initial?;

        let mut best = refine(initial, problem);
        let evaluation = evaluate(&best, problem);
        let Cost::Finite(initial_cost) = evaluation.cost else {
            debug!("Refined initial route {} is infeasible", best);
            return None;
        };
        let mut best_cost = initial_cost;

        let mut stats = SearchStats {
            iterations: 0,
            improvements: 0,
            initial_cost,
        };

        for iteration in 0..self.config.iterations {
            if self.is_cancelled() {
                info!("Search cancelled after {} iterations", iteration);
                break;
            }
            let candidate = refine(&perturb(&best, self.config.perturbation_level, rng), problem);
            let evaluation = evaluate(&candidate, problem);
            stats.iterations += 1;

            if let Cost::Finite(cost) = evaluation.cost {
                if cost < best_cost {
                    debug!("Iteration {}: cost {} -> {}", iteration, best_cost, cost);
                    best = candidate;
                    best_cost = cost;
                    stats.improvements += 1;
                }
            }
        }

        info!(
            "Search finished: cost {} -> {} after {} iterations ({} improvements)",
            initial_cost, best_cost, stats.iterations, stats.improvements
        );

        Some(Solution {
            route: best,
            cost: best_cost,
            stats,
        })
    }
}
