//! Travel-time source for route planning
//!
//! Road-graph lookup and shortest paths live outside this worker. The
//! planner only needs a stop-to-stop matrix, obtained through
//! [`TravelTimeProvider`].

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::services::vrptw::{StopId, TravelTimeMatrix};

/// Source of stop-to-stop travel times in minutes
#[async_trait]
pub trait TravelTimeProvider: Send + Sync {
    /// Matrix covering (at least) every pair of `stops`
    async fn travel_times(&self, stops: &[StopId]) -> Result<TravelTimeMatrix>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Serves a matrix that was computed ahead of time
pub struct StaticTravelTimes {
    matrix: TravelTimeMatrix,
}

impl StaticTravelTimes {
    pub fn new(matrix: TravelTimeMatrix) -> Self {
        Self { matrix }
    }
}

#[async_trait]
impl TravelTimeProvider for StaticTravelTimes {
    async fn travel_times(&self, stops: &[StopId]) -> Result<TravelTimeMatrix> {
        if stops.is_empty() {
            bail!("no stops requested");
        }
        Ok(self.matrix.restricted_to(stops))
    }

    fn name(&self) -> &str {
        "StaticTravelTimes"
    }
}
