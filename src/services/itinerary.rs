//! Per-stop timestamps for a finished route
//!
//! Re-runs the time simulation on the chosen order and labels each stop for
//! display.

use chrono::{NaiveTime, Timelike};

use crate::defaults::MINUTES_PER_DAY;
use crate::services::vrptw::{simulate, Minutes, Problem, Route, Violation};
use crate::types::{ItineraryEntry, RoutePlanRequest, StopKind};

/// Itinerary for `route`; fails only if the route violates the problem.
pub fn build_itinerary(
    route: &Route,
    problem: &Problem,
    request: &RoutePlanRequest,
) -> Result<Vec<ItineraryEntry>, Violation> {
    let schedule = simulate(route, problem)?;

    Ok(schedule
        .visits
        .iter()
        .map(|visit| {
            let (kind, name) = if visit.stop == request.depot {
                (StopKind::Depot, None)
            } else if visit.stop == request.school {
                (StopKind::School, request.school_name.clone())
            } else {
                let name = request.student(visit.stop).and_then(|s| s.name.clone());
                (StopKind::Student, name)
            };
            let arrival_minutes = visit.service_start();
            ItineraryEntry {
                stop_id: visit.stop,
                kind,
                name,
                arrival_minutes,
                time: format_clock(arrival_minutes),
            }
        })
        .collect())
}

/// Render minutes of day as `HH:MM`; values past midnight keep counting hours.
pub fn format_clock(minutes: Minutes) -> String {
    if minutes < MINUTES_PER_DAY {
        if let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt((minutes * 60) as u32, 0) {
            return time.format("%H:%M").to_string();
        }
    }
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Parse `HH:MM` into minutes of day
pub fn parse_clock(text: &str) -> Option<Minutes> {
    let time = NaiveTime::parse_from_str(text.trim(), "%H:%M").ok()?;
    Some((time.hour() * 60 + time.minute()) as Minutes)
}
