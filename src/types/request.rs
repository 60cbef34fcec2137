//! Route planning request types

use serde::{Deserialize, Serialize};

use crate::defaults::default_service_time;
use crate::services::vrptw::{Minutes, StopId, TimeWindow, TravelTimeMatrix};

/// Direction of the school run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RouteMode {
    /// Depot -> students -> school, arriving before class starts
    #[default]
    Outbound,
    /// School -> students -> depot, leaving after class ends
    Return,
}

/// A student pickup or drop-off point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStop {
    pub id: StopId,
    #[serde(default)]
    pub name: Option<String>,
    /// Own pickup window; required in outbound mode, ignored in return mode
    #[serde(default)]
    pub pickup_window: Option<TimeWindow>,
}

/// Request to plan one school route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutePlanRequest {
    #[serde(default)]
    pub mode: RouteMode,
    /// Depot (garage) stop id
    pub depot: StopId,
    /// School stop id
    pub school: StopId,
    #[serde(default)]
    pub school_name: Option<String>,
    /// Class start (outbound) or class end (return), minutes of day
    #[serde(default)]
    pub class_time: Option<Minutes>,
    #[serde(default)]
    pub students: Vec<StudentStop>,
    /// Minutes spent at each student stop
    #[serde(default = "default_service_time")]
    pub service_time: Minutes,
}

impl RoutePlanRequest {
    /// Every stop id the request touches: depot, school, then students
    pub fn stop_ids(&self) -> Vec<StopId> {
        let mut ids = Vec::with_capacity(self.students.len() + 2);
        ids.push(self.depot);
        ids.push(self.school);
        ids.extend(self.students.iter().map(|s| s.id));
        ids
    }

    pub fn student(&self, id: StopId) -> Option<&StudentStop> {
        self.students.iter().find(|s| s.id == id)
    }
}

/// Problem file read by the CLI: the request plus its travel-time matrix
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemFile {
    pub request: RoutePlanRequest,
    pub travel_time_matrix: TravelTimeMatrix,
}
