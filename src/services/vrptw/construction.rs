//! Initial route construction: nearest seed, then farthest-first insertion
//!
//! The build is strict and greedy. An infeasible seed route, or a stop that
//! fits nowhere in the current route, aborts the whole construction.

use tracing::debug;

use super::evaluator::{evaluate, Cost};
use super::problem::{Problem, Route, StopId};

/// Build a feasible starting route, or `None` if the greedy insertion gets stuck.
///
/// Ties are resolved in favour of the stop (or position) seen first, so the
/// result is deterministic for a fixed input order.
pub fn build_initial_route(problem: &Problem) -> Option<Route> {
    let origin = problem.origin().id;
    let destination = problem.destination().id;

    let mut unvisited: Vec<StopId> = problem.regular_stops().iter().map(|s| s.id).collect();
    if unvisited.is_empty() {
        return Some(Route::new(vec![origin, destination]));
    }

    let seed_position = closest_to(problem, origin, &unvisited);
    let seed = unvisited.remove(seed_position);

    let mut route = Route::new(vec![origin, seed, destination]);
    if !evaluate(&route, problem).feasible {
        debug!("Seed route {} is infeasible", route);
        return None;
    }

    while !unvisited.is_empty() {
        let candidate_position = farthest_from_route(problem, &route, &unvisited);
        let candidate = unvisited[candidate_position];

        let Some(insert_at) = cheapest_feasible_position(problem, &route, candidate) else {
            debug!("No feasible position for stop {} in {}", candidate, route);
            return None;
        };

        route = route.with_inserted(insert_at, candidate);
        unvisited.remove(candidate_position);
    }

    Some(route)
}

/// Index into `candidates` of the stop with the shortest travel time from `from`.
fn closest_to(problem: &Problem, from: StopId, candidates: &[StopId]) -> usize {
    let mut best = 0;
    let mut best_cost = Cost::Infinite;
    for (position, &id) in candidates.iter().enumerate() {
        let cost = Cost::from(problem.travel(from, id));
        if cost < best_cost {
            best = position;
            best_cost = cost;
        }
    }
    best
}

/// Index into `candidates` of the stop whose nearest route stop is farthest away.
fn farthest_from_route(problem: &Problem, route: &Route, candidates: &[StopId]) -> usize {
    let mut best = 0;
    let mut best_distance: Option<Cost> = None;
    for (position, &id) in candidates.iter().enumerate() {
        let nearest = route
            .stops()
            .iter()
            .map(|&member| Cost::from(problem.travel(id, member)))
            .min()
            .unwrap_or(Cost::Infinite);
        if best_distance.map_or(true, |current| nearest > current) {
            best = position;
            best_distance = Some(nearest);
        }
    }
    best
}

/// Position (index to insert at) minimizing the detour among feasible insertions.
fn cheapest_feasible_position(problem: &Problem, route: &Route, candidate: StopId) -> Option<usize> {
    let mut best: Option<(usize, i128)> = None;

    for (offset, pair) in route.stops().windows(2).enumerate() {
        let (prev, next) = (pair[0], pair[1]);
        let insert_at = offset + 1;

        if !evaluate(&route.with_inserted(insert_at, candidate), problem).feasible {
            continue;
        }

        let Some(detour) = detour(problem, prev, candidate, next) else {
            continue;
        };
        if best.map_or(true, |(_, current)| detour < current) {
            best = Some((insert_at, detour));
        }
    }

    best.map(|(insert_at, _)| insert_at)
}

/// `d(prev, candidate) + d(candidate, next) - d(prev, next)`
fn detour(problem: &Problem, prev: StopId, candidate: StopId, next: StopId) -> Option<i128> {
    let to_candidate = problem.travel(prev, candidate)?;
    let from_candidate = problem.travel(candidate, next)?;
    let direct = problem.travel(prev, next)?;
    Some(to_candidate as i128 + from_candidate as i128 - direct as i128)
}
