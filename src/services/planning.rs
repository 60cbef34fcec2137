//! Problem assembly and end-to-end route planning
//!
//! Turns a [`RoutePlanRequest`] plus travel times into an engine
//! [`Problem`], runs construction and search, and renders the plan. Every
//! failure is categorised here as a [`PlanError`] with a readable message.

use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::services::itinerary::build_itinerary;
use crate::services::vrptw::{
    build_initial_route, Problem, ProblemError, RouteOptimizer, SolverConfig, Stop, StopId,
    TimeWindow, TravelTimeMatrix, Violation,
};
use crate::types::{RouteMode, RoutePlan, RoutePlanRequest};

/// Why a planning request produced no route
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Insufficient data: a depot, a school and at least one student are required")]
    InsufficientData,
    #[error("The school needs a class time")]
    MissingDeadline,
    #[error("Student {0} has no pickup window")]
    MissingPickupWindow(StopId),
    #[error("Invalid problem: {0}")]
    InvalidProblem(#[from] ProblemError),
    #[error("Could not load travel times: {0}")]
    TravelTimes(String),
    #[error("Could not build a feasible initial route within the time windows")]
    UnconstructibleRoute,
    #[error("The solver could not find a feasible route")]
    NoFeasibleSolution,
    #[error("Could not derive the route schedule: {0}")]
    Schedule(#[from] Violation),
    #[error("Optimization timed out after {0:?}")]
    Timeout(Duration),
    #[error("Optimization worker failed: {0}")]
    Worker(String),
}

/// Build the engine problem for the request's mode.
///
/// Outbound runs depot -> school with the class start as the school's
/// deadline. Return runs school -> depot, and every student shares the class
/// end as earliest pickup.
pub fn assemble_problem(
    request: &RoutePlanRequest,
    matrix: TravelTimeMatrix,
) -> Result<Problem, PlanError> {
    if request.students.is_empty() {
        return Err(PlanError::InsufficientData);
    }
    let class_time = request.class_time.ok_or(PlanError::MissingDeadline)?;

    let (origin, destination, students) = match request.mode {
        RouteMode::Outbound => {
            let students = request
                .students
                .iter()
                .map(|s| {
                    s.pickup_window
                        .map(|window| Stop::regular(s.id, window))
                        .ok_or(PlanError::MissingPickupWindow(s.id))
                })
                .collect::<Result<Vec<_>, _>>()?;
            (
                Stop::origin(request.depot, TimeWindow::unconstrained()),
                Stop::destination(request.school, TimeWindow::new(0, class_time)),
                students,
            )
        }
        RouteMode::Return => {
            let shared = TimeWindow::new(class_time, TimeWindow::unconstrained().latest);
            let students = request
                .students
                .iter()
                .map(|s| Stop::regular(s.id, shared))
                .collect();
            (
                Stop::origin(request.school, shared),
                Stop::destination(request.depot, TimeWindow::unconstrained()),
                students,
            )
        }
    };

    debug!(
        "Assembled {:?} problem: origin={} destination={} students={}",
        request.mode,
        origin.id,
        destination.id,
        students.len()
    );

    Ok(Problem::new(
        origin,
        destination,
        students,
        matrix,
        request.service_time,
    )?)
}

/// Construct, optimize and render a route. CPU-bound; run off the async runtime.
pub fn plan_route(
    request: &RoutePlanRequest,
    problem: &Problem,
    config: &SolverConfig,
) -> Result<RoutePlan, PlanError> {
    plan_route_cancellable(request, problem, config, CancellationToken::new())
}

/// Same as [`plan_route`], but the search ends early once `cancel` fires.
pub fn plan_route_cancellable(
    request: &RoutePlanRequest,
    problem: &Problem,
    config: &SolverConfig,
    cancel: CancellationToken,
) -> Result<RoutePlan, PlanError> {
    let started_at = Instant::now();

    let Some(initial) = build_initial_route(problem) else {
        warn!("Initial route construction failed");
        return Err(PlanError::UnconstructibleRoute);
    };
    debug!("Initial route: {}", initial);

    let optimizer = RouteOptimizer::new(config.clone()).with_cancellation(cancel);
    let solution = optimizer
        .solve(problem, Some(&initial), &mut config.rng())
        .ok_or(PlanError::NoFeasibleSolution)?;

    let itinerary = build_itinerary(&solution.route, problem, request)?;
    let solve_time_ms = started_at.elapsed().as_millis() as u64;

    info!(
        "Planned route {} with {} min travel in {} ms",
        solution.route, solution.cost, solve_time_ms
    );

    Ok(RoutePlan {
        stop_order: solution.route.into_inner(),
        total_travel_minutes: solution.cost,
        itinerary,
        search: solution.stats,
        solve_time_ms,
    })
}
