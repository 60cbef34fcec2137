use std::time::Duration;

use crate::services::vrptw::Minutes;

pub const MINUTES_PER_DAY: Minutes = 1440;

pub const DEFAULT_SERVICE_TIME_MINUTES: Minutes = 1;

pub const DEFAULT_ITERATIONS: usize = 2000;

pub const DEFAULT_PERTURBATION_LEVEL: usize = 3;

pub const DEFAULT_JOB_RESULT_CAPACITY: usize = 100;

pub fn default_job_timeout() -> Duration {
    Duration::from_secs(300)
}

pub fn default_service_time() -> Minutes {
    DEFAULT_SERVICE_TIME_MINUTES
}
