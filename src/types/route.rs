//! Route plan types

use serde::{Deserialize, Serialize};

use crate::services::vrptw::{Minutes, SearchStats, StopId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Depot,
    School,
    Student,
}

/// One row of the rendered itinerary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryEntry {
    pub stop_id: StopId,
    pub kind: StopKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Minute of day the stop is served (after any waiting)
    pub arrival_minutes: Minutes,
    /// `arrival_minutes` as HH:MM
    pub time: String,
}

/// Result of a successful route planning job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlan {
    pub stop_order: Vec<StopId>,
    /// Sum of travel durations only, excluding waiting and service
    pub total_travel_minutes: Minutes,
    pub itinerary: Vec<ItineraryEntry>,
    pub search: SearchStats,
    pub solve_time_ms: u64,
}

impl RoutePlan {
    /// Summary line shown once the job completes
    pub fn summary(&self) -> String {
        format!(
            "Route optimized with total travel time of {} min",
            self.total_travel_minutes
        )
    }
}
