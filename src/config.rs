//! Configuration management

use std::str::FromStr;
use std::time::Duration;

use anyhow::{self, Context, Result};

use crate::defaults::{
    default_job_timeout, DEFAULT_ITERATIONS, DEFAULT_JOB_RESULT_CAPACITY,
    DEFAULT_PERTURBATION_LEVEL,
};
use crate::services::vrptw::SolverConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Search budget and random seed
    pub solver: SolverConfig,

    /// Wall-clock limit for one background job
    pub job_timeout: Duration,

    /// Number of job results kept for polling
    pub job_result_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            job_timeout: default_job_timeout(),
            job_result_capacity: DEFAULT_JOB_RESULT_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let iterations = parse_var(&lookup, "SOLVER_ITERATIONS", DEFAULT_ITERATIONS)?;
        let perturbation_level =
            parse_var(&lookup, "SOLVER_PERTURBATION_LEVEL", DEFAULT_PERTURBATION_LEVEL)?;
        let seed = parse_optional_var::<u64>(&lookup, "SOLVER_SEED")?;

        let timeout_seconds =
            parse_var(&lookup, "JOB_TIMEOUT_SECONDS", default_job_timeout().as_secs())?;
        if timeout_seconds == 0 {
            anyhow::bail!("JOB_TIMEOUT_SECONDS must be greater than zero");
        }

        let job_result_capacity =
            parse_var(&lookup, "JOB_RESULT_CAPACITY", DEFAULT_JOB_RESULT_CAPACITY)?;
        if job_result_capacity == 0 {
            anyhow::bail!("JOB_RESULT_CAPACITY must be greater than zero");
        }

        Ok(Self {
            solver: SolverConfig {
                iterations,
                perturbation_level,
                seed,
            },
            job_timeout: Duration::from_secs(timeout_seconds),
            job_result_capacity,
        })
    }
}

fn parse_optional_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        _ => Ok(None),
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    Ok(parse_optional_var(lookup, key)?.unwrap_or(default))
}
