//! Time-window feasibility and travel cost of a candidate route
//!
//! The clock starts at the origin's earliest bound. For each leg the vehicle
//! travels, waits until the next stop's window opens and, at regular stops,
//! spends the fixed service time. Arriving after a stop's latest bound, or
//! needing an unreachable leg, makes the route infeasible.
//!
//! Cost is the sum of raw travel durations only. Waiting and service time
//! shape feasibility but are not part of the cost.

use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use super::problem::{Minutes, Problem, Route, Stop, StopId};

/// Travel cost, with an infinite sentinel for infeasible routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cost {
    Finite(Minutes),
    Infinite,
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cost::Finite(a), Cost::Finite(b)) => a.cmp(b),
            (Cost::Finite(_), Cost::Infinite) => Ordering::Less,
            (Cost::Infinite, Cost::Finite(_)) => Ordering::Greater,
            (Cost::Infinite, Cost::Infinite) => Ordering::Equal,
        }
    }
}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<Option<Minutes>> for Cost {
    fn from(value: Option<Minutes>) -> Self {
        value.map_or(Cost::Infinite, Cost::Finite)
    }
}

/// Outcome of evaluating a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub feasible: bool,
    pub cost: Cost,
}

impl Evaluation {
    pub fn infeasible() -> Self {
        Self {
            feasible: false,
            cost: Cost::Infinite,
        }
    }

    fn with_cost(cost: Minutes) -> Self {
        Self {
            feasible: true,
            cost: Cost::Finite(cost),
        }
    }

    /// Feasible and strictly cheaper than `other`
    pub fn improves_on(&self, other: &Evaluation) -> bool {
        self.feasible && self.cost < other.cost
    }
}

/// Reason a route failed the time simulation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("stop {0} is not part of the problem")]
    UnknownStop(StopId),
    #[error("no path from stop {from} to stop {to}")]
    Unreachable { from: StopId, to: StopId },
    #[error("arrival at stop {stop} at minute {arrival} is after its latest bound {latest}")]
    LateArrival {
        stop: StopId,
        arrival: Minutes,
        latest: Minutes,
    },
}

/// Simulated visit of one stop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub stop: StopId,
    /// Raw arrival, before any waiting
    pub arrival: Minutes,
    pub wait: Minutes,
    /// Clock after waiting and service
    pub departure: Minutes,
}

impl Visit {
    /// Moment the stop is actually served: arrival plus wait
    pub fn service_start(&self) -> Minutes {
        self.arrival + self.wait
    }
}

/// Full time simulation of a feasible route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub visits: Vec<Visit>,
    pub travel_minutes: Minutes,
}

/// One leg of the simulation: travel to `stop`, wait for its window, serve it.
fn advance(
    problem: &Problem,
    clock: Minutes,
    from: StopId,
    stop: &Stop,
) -> Result<(Visit, Minutes), Violation> {
    let travel = problem
        .travel(from, stop.id)
        .ok_or(Violation::Unreachable { from, to: stop.id })?;

    let arrival = clock.saturating_add(travel);
    if arrival > stop.window.latest {
        return Err(Violation::LateArrival {
            stop: stop.id,
            arrival,
            latest: stop.window.latest,
        });
    }

    let wait = stop.window.earliest.saturating_sub(arrival);
    let departure = (arrival + wait).saturating_add(problem.service_duration(stop));

    Ok((
        Visit {
            stop: stop.id,
            arrival,
            wait,
            departure,
        },
        travel,
    ))
}

fn lookup(problem: &Problem, id: StopId) -> Result<&Stop, Violation> {
    problem.stop(id).ok_or(Violation::UnknownStop(id))
}

/// Simulate `route` and report the first violated constraint, if any.
pub fn simulate(route: &Route, problem: &Problem) -> Result<Schedule, Violation> {
    let stops = route.stops();
    let mut visits = Vec::with_capacity(stops.len());
    let mut travel_minutes: Minutes = 0;

    let Some(&first) = stops.first() else {
        return Ok(Schedule {
            visits,
            travel_minutes,
        });
    };

    let first_stop = lookup(problem, first)?;
    let mut clock = problem.origin().window.earliest;
    visits.push(Visit {
        stop: first_stop.id,
        arrival: clock,
        wait: 0,
        departure: clock,
    });

    for pair in stops.windows(2) {
        let stop = lookup(problem, pair[1])?;
        let (visit, travel) = advance(problem, clock, pair[0], stop)?;
        clock = visit.departure;
        travel_minutes = travel_minutes.saturating_add(travel);
        visits.push(visit);
    }

    Ok(Schedule {
        visits,
        travel_minutes,
    })
}

/// Feasibility and travel-only cost of `route`.
///
/// Allocation-free twin of [`simulate`]; both walk the route with the same
/// step function.
pub fn evaluate(route: &Route, problem: &Problem) -> Evaluation {
    let stops = route.stops();
    if let Some(&first) = stops.first() {
        if problem.stop(first).is_none() {
            return Evaluation::infeasible();
        }
    }

    let mut clock = problem.origin().window.earliest;
    let mut cost: Minutes = 0;

    for pair in stops.windows(2) {
        let Some(stop) = problem.stop(pair[1]) else {
            return Evaluation::infeasible();
        };
        match advance(problem, clock, pair[0], stop) {
            Ok((visit, travel)) => {
                clock = visit.departure;
                cost = cost.saturating_add(travel);
            }
            Err(_) => return Evaluation::infeasible(),
        }
    }

    Evaluation::with_cost(cost)
}
