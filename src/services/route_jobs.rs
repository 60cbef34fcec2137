//! Background processing of route optimization jobs
//!
//! A submitted request gets a job id right away. The solve itself (travel
//! times, problem assembly, construction and search) runs on a spawned task,
//! with the CPU-bound part on the blocking pool, under a wall-clock deadline.
//! Results land in the [`JobRegistry`] for polling.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::services::job_registry::JobRegistry;
use crate::services::planning::{assemble_problem, plan_route_cancellable, PlanError};
use crate::services::travel_times::TravelTimeProvider;
use crate::services::vrptw::SolverConfig;
use crate::types::{JobStatusResponse, JobSubmitResponse, RoutePlan, RoutePlanRequest};

/// Shared state for job processing
pub struct RouteJobProcessor {
    registry: Arc<JobRegistry>,
    travel_times: Arc<dyn TravelTimeProvider>,
    solver_config: SolverConfig,
    job_timeout: Duration,
}

impl RouteJobProcessor {
    pub fn new(
        registry: Arc<JobRegistry>,
        travel_times: Arc<dyn TravelTimeProvider>,
        solver_config: SolverConfig,
        job_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            travel_times,
            solver_config,
            job_timeout,
        }
    }

    pub fn from_config(config: &Config, travel_times: Arc<dyn TravelTimeProvider>) -> Self {
        Self::new(
            Arc::new(JobRegistry::new(config.job_result_capacity)),
            travel_times,
            config.solver.clone(),
            config.job_timeout,
        )
    }

    /// Queue a solve and return its job id without waiting for it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(self: &Arc<Self>, request: RoutePlanRequest) -> JobSubmitResponse {
        let job_id = Uuid::new_v4();
        self.registry.register(job_id, "Optimization started");
        info!(
            "Job {} submitted with {} students ({:?}), {} jobs running",
            job_id,
            request.students.len(),
            request.mode,
            self.registry.running()
        );

        let processor = Arc::clone(self);
        tokio::spawn(async move {
            processor.process_job(job_id, request).await;
        });

        JobSubmitResponse { job_id }
    }

    /// Non-blocking status lookup
    pub fn status(&self, job_id: Uuid) -> JobStatusResponse {
        self.registry.status(job_id)
    }

    async fn process_job(&self, job_id: Uuid, request: RoutePlanRequest) {
        match self.plan(request).await {
            Ok(plan) => {
                info!("Job {} complete: {}", job_id, plan.summary());
                self.registry.complete(job_id, plan.summary(), plan);
            }
            Err(e) => {
                error!("Job {} failed: {}", job_id, e);
                self.registry.fail(job_id, e.to_string());
            }
        }
    }

    /// Run the whole planning pipeline under the configured deadline.
    ///
    /// On timeout the pending pipeline is dropped, which cancels the blocking
    /// search; it stops at its next iteration and its result is discarded.
    pub async fn plan(&self, request: RoutePlanRequest) -> Result<RoutePlan, PlanError> {
        match tokio::time::timeout(self.job_timeout, self.plan_without_deadline(request)).await {
            Ok(result) => result,
            Err(_) => Err(PlanError::Timeout(self.job_timeout)),
        }
    }

    async fn plan_without_deadline(&self, request: RoutePlanRequest) -> Result<RoutePlan, PlanError> {
        let matrix = self
            .travel_times
            .travel_times(&request.stop_ids())
            .await
            .map_err(|e| PlanError::TravelTimes(format!("{:#}", e)))?;
        info!("Travel times loaded from {}", self.travel_times.name());

        let problem = assemble_problem(&request, matrix)?;
        let config = self.solver_config.clone();

        // Cancels the search if this future is dropped before the solve returns
        let cancel = CancellationToken::new();
        let _cancel_on_drop = cancel.clone().drop_guard();

        tokio::task::spawn_blocking(move || plan_route_cancellable(&request, &problem, &config, cancel))
            .await
            .map_err(|e| PlanError::Worker(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::travel_times::StaticTravelTimes;
    use crate::services::vrptw::{StopId, TimeWindow, TravelTimeMatrix};
    use crate::types::{JobStatus, RouteMode, StudentStop};
    use anyhow::{bail, Result};
    use async_trait::async_trait;

    const DEPOT: StopId = -1;
    const SCHOOL: StopId = 0;

    fn request(class_time: Option<u64>) -> RoutePlanRequest {
        RoutePlanRequest {
            mode: RouteMode::Outbound,
            depot: DEPOT,
            school: SCHOOL,
            school_name: None,
            class_time,
            students: vec![StudentStop {
                id: 1,
                name: None,
                pickup_window: Some(TimeWindow::unconstrained()),
            }],
            service_time: 1,
        }
    }

    fn matrix() -> TravelTimeMatrix {
        TravelTimeMatrix::new()
            .with(DEPOT, 1, 5)
            .with(1, SCHOOL, 5)
            .with(DEPOT, SCHOOL, 12)
            .with(SCHOOL, 1, 5)
            .with(1, DEPOT, 5)
    }

    fn processor(provider: Arc<dyn TravelTimeProvider>, timeout: Duration) -> Arc<RouteJobProcessor> {
        Arc::new(RouteJobProcessor::new(
            Arc::new(JobRegistry::new(10)),
            provider,
            SolverConfig::new(20, 3).with_seed(1),
            timeout,
        ))
    }

    async fn wait_until_finished(processor: &RouteJobProcessor, job_id: Uuid) -> JobStatus {
        for _ in 0..500 {
            let status = processor.status(job_id).status;
            if status.is_finished() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", job_id);
    }

    struct SlowTravelTimes;

    #[async_trait]
    impl TravelTimeProvider for SlowTravelTimes {
        async fn travel_times(&self, _stops: &[StopId]) -> Result<TravelTimeMatrix> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(TravelTimeMatrix::new())
        }

        fn name(&self) -> &str {
            "Slow"
        }
    }

    struct BrokenTravelTimes;

    #[async_trait]
    impl TravelTimeProvider for BrokenTravelTimes {
        async fn travel_times(&self, _stops: &[StopId]) -> Result<TravelTimeMatrix> {
            bail!("road graph unavailable")
        }

        fn name(&self) -> &str {
            "Broken"
        }
    }

    #[tokio::test]
    async fn test_submitted_job_completes() {
        let processor = processor(Arc::new(StaticTravelTimes::new(matrix())), Duration::from_secs(30));

        let response = processor.submit(request(Some(20)));
        assert!(!processor.status(response.job_id).status.is_finished());

        match wait_until_finished(&processor, response.job_id).await {
            JobStatus::Complete { message, result } => {
                assert_eq!(result.stop_order, vec![DEPOT, 1, SCHOOL]);
                assert_eq!(result.total_travel_minutes, 10);
                assert!(message.contains("10 min"));
            }
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_infeasible_job_fails_with_message() {
        let processor = processor(Arc::new(StaticTravelTimes::new(matrix())), Duration::from_secs(30));

        let response = processor.submit(request(Some(8)));

        match wait_until_finished(&processor, response.job_id).await {
            JobStatus::Failed { error } => {
                assert_eq!(error, PlanError::UnconstructibleRoute.to_string());
            }
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_deadline_fails() {
        let processor = processor(Arc::new(StaticTravelTimes::new(matrix())), Duration::from_secs(30));

        let err = processor.plan(request(None)).await.unwrap_err();
        assert!(matches!(err, PlanError::MissingDeadline));
    }

    #[tokio::test]
    async fn test_travel_time_failure_is_reported() {
        let processor = processor(Arc::new(BrokenTravelTimes), Duration::from_secs(30));

        let err = processor.plan(request(Some(20))).await.unwrap_err();
        match err {
            PlanError::TravelTimes(message) => assert!(message.contains("road graph unavailable")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deadline_is_enforced() {
        let processor = processor(Arc::new(SlowTravelTimes), Duration::from_millis(20));

        let response = processor.submit(request(Some(20)));

        match wait_until_finished(&processor, response.job_id).await {
            JobStatus::Failed { error } => assert_eq!(error, "Optimization timed out after 20ms"),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deadline_cancels_running_solve() {
        // The search never ends on its own; only cancellation stops it
        let processor = Arc::new(RouteJobProcessor::new(
            Arc::new(JobRegistry::new(10)),
            Arc::new(StaticTravelTimes::new(matrix())),
            SolverConfig::new(usize::MAX, 3).with_seed(1),
            Duration::from_millis(50),
        ));

        let response = processor.submit(request(Some(20)));

        match wait_until_finished(&processor, response.job_id).await {
            JobStatus::Failed { error } => assert_eq!(error, "Optimization timed out after 50ms"),
            other => panic!("unexpected status {:?}", other),
        }

        // Runtime shutdown waits for blocking tasks, so the test only
        // finishes if the abandoned search observed the cancellation.
    }

    #[tokio::test]
    async fn test_unknown_job_status() {
        let processor = processor(Arc::new(StaticTravelTimes::new(matrix())), Duration::from_secs(30));
        assert_eq!(processor.status(Uuid::new_v4()).status, JobStatus::Unknown);
    }
}
