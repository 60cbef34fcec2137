//! Single-vehicle routing with time windows (VRPTW)
//!
//! Greedy construction (nearest seed, farthest-first insertion) followed by
//! an iterated local search built from 2-opt refinement and random swaps.

mod config;
mod construction;
mod evaluator;
mod perturbation;
mod problem;
mod search;
mod two_opt;

pub use config::SolverConfig;
pub use construction::build_initial_route;
pub use evaluator::{evaluate, simulate, Cost, Evaluation, Schedule, Violation, Visit};
pub use perturbation::perturb;
pub use problem::{
    Minutes, Problem, ProblemError, Route, Stop, StopId, StopRole, TimeWindow, TravelTimeMatrix,
};
pub use search::{RouteOptimizer, SearchStats, Solution};
pub use two_opt::refine;
