//! Job result registry
//!
//! Holds the status of submitted optimization jobs in memory so callers can
//! poll them. Storage is bounded: once `capacity` is reached the oldest
//! finished jobs are evicted first. Running jobs are never evicted.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::types::{JobStatus, JobStatusResponse, RoutePlan};

#[derive(Debug, Clone)]
struct JobRecord {
    status: JobStatus,
    submitted_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct Jobs {
    records: HashMap<Uuid, JobRecord>,
    /// Submission order, oldest first
    order: VecDeque<Uuid>,
}

/// Bounded in-memory store of job statuses
pub struct JobRegistry {
    jobs: RwLock<Jobs>,
    capacity: usize,
}

impl JobRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            jobs: RwLock::new(Jobs::default()),
            capacity: capacity.max(1),
        }
    }

    /// Register a freshly submitted job as running
    pub fn register(&self, id: Uuid, message: impl Into<String>) {
        let mut jobs = self.jobs.write();
        Self::evict(&mut jobs, self.capacity.saturating_sub(1));

        jobs.records.insert(
            id,
            JobRecord {
                status: JobStatus::Running {
                    message: message.into(),
                },
                submitted_at: Utc::now(),
                finished_at: None,
            },
        );
        jobs.order.push_back(id);
    }

    /// Record a final (or updated) status for a known job
    pub fn update(&self, id: Uuid, status: JobStatus) -> bool {
        let mut jobs = self.jobs.write();
        let Some(record) = jobs.records.get_mut(&id) else {
            debug!("Status update for unknown job {}", id);
            return false;
        };
        if status.is_finished() {
            record.finished_at = Some(Utc::now());
        }
        record.status = status;
        true
    }

    pub fn complete(&self, id: Uuid, message: String, result: RoutePlan) -> bool {
        self.update(id, JobStatus::Complete { message, result })
    }

    pub fn fail(&self, id: Uuid, error: String) -> bool {
        self.update(id, JobStatus::Failed { error })
    }

    /// Current status; `Unknown` for ids never seen or already evicted
    pub fn status(&self, id: Uuid) -> JobStatusResponse {
        let jobs = self.jobs.read();
        match jobs.records.get(&id) {
            Some(record) => JobStatusResponse {
                job_id: id,
                status: record.status.clone(),
                submitted_at: Some(record.submitted_at),
                finished_at: record.finished_at,
            },
            None => JobStatusResponse {
                job_id: id,
                status: JobStatus::Unknown,
                submitted_at: None,
                finished_at: None,
            },
        }
    }

    pub fn len(&self) -> usize {
        self.jobs.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of jobs still running
    pub fn running(&self) -> usize {
        self.jobs
            .read()
            .records
            .values()
            .filter(|r| !r.status.is_finished())
            .count()
    }

    /// Drop finished jobs, oldest first, until at most `target` records remain.
    fn evict(jobs: &mut Jobs, target: usize) {
        if jobs.records.len() <= target {
            return;
        }

        let mut excess = jobs.records.len() - target;
        let Jobs { records, order } = jobs;
        order.retain(|id| {
            if excess == 0 {
                return true;
            }
            let finished = records.get(id).map_or(true, |r| r.status.is_finished());
            if finished {
                records.remove(id);
                excess -= 1;
                debug!("Evicted job {}", id);
                false
            } else {
                true
            }
        });
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new(crate::defaults::DEFAULT_JOB_RESULT_CAPACITY)
    }
}
