//! Job types for background route optimization
//!
//! A solve runs off the request path; callers get a job id back and poll
//! its status.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::route::RoutePlan;

// ==========================================================================
// Tests First (TDD)
// ==========================================================================


// ==========================================================================
// Implementation
// ==========================================================================

/// Response when a job is submitted
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSubmitResponse {
    /// Opaque job identifier for status queries
    pub job_id: Uuid,
}

/// State of an optimization job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum JobStatus {
    /// Solve in progress
    Running { message: String },
    /// Solve finished with a route
    Complete { message: String, result: RoutePlan },
    /// Solve finished without a route
    Failed { error: String },
    /// No job with this id is held (never submitted or evicted)
    Unknown,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Complete { .. } | JobStatus::Failed { .. })
    }
}

/// Answer to a status query
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    #[serde(flatten)]
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}
