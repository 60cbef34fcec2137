//! School bus worker - plans single-vehicle school routes
//!
//! Reads a problem file (route request plus travel-time matrix), runs the
//! optimizer and prints the plan as JSON on stdout.

mod cli;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use schoolbus_worker::config::Config;
use schoolbus_worker::services::route_jobs::RouteJobProcessor;
use schoolbus_worker::services::travel_times::StaticTravelTimes;
use schoolbus_worker::types::{JobStatus, ProblemFile};

use cli::{Cli, Command};

const DEFAULT_PROBLEM_FILE: &str = "problem.json";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs directory - use LOGS_DIR env var or default to ../logs (relative to worker)
    let logs_dir = std::env::var("LOGS_DIR")
        .unwrap_or_else(|_| "../logs".to_string());
    std::fs::create_dir_all(&logs_dir).ok();

    // File appender for persistent logs (daily rotation)
    let file_appender = RollingFileAppender::new(
        Rotation::DAILY,
        &logs_dir,
        "worker.log",
    );
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // stdout carries the JSON result, so console logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,schoolbus_worker=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    info!("Starting School Bus Worker...");

    let mut config = Config::from_env()?;
    info!("Configuration loaded");

    let command = cli.command.unwrap_or(Command::Solve {
        problem: None,
        seed: None,
        iterations: None,
        perturbation: None,
        class_time: None,
    });

    match command {
        Command::Solve {
            problem,
            seed,
            iterations,
            perturbation,
            class_time,
        } => {
            if let Some(seed) = seed {
                config.solver.seed = Some(seed);
            }
            if let Some(iterations) = iterations {
                config.solver.iterations = iterations;
            }
            if let Some(level) = perturbation {
                config.solver.perturbation_level = level;
            }

            let mut file = load_problem(&problem_path(problem))?;
            if class_time.is_some() {
                file.request.class_time = class_time;
            }

            let processor = RouteJobProcessor::from_config(
                &config,
                Arc::new(StaticTravelTimes::new(file.travel_time_matrix)),
            );
            match processor.plan(file.request).await {
                Ok(plan) => {
                    info!("{}", plan.summary());
                    println!("{}", serde_json::to_string_pretty(&plan)?);
                }
                Err(e) => {
                    error!("Planning failed: {}", e);
                    return Err(e.into());
                }
            }
        }
        Command::Submit { problem, poll_ms } => {
            let file = load_problem(&problem_path(problem))?;
            let processor = Arc::new(RouteJobProcessor::from_config(
                &config,
                Arc::new(StaticTravelTimes::new(file.travel_time_matrix)),
            ));

            let submitted = processor.submit(file.request);
            info!("Submitted job {}", submitted.job_id);

            let status = loop {
                let status = processor.status(submitted.job_id);
                if status.status.is_finished() {
                    break status;
                }
                tokio::time::sleep(Duration::from_millis(poll_ms)).await;
            };

            println!("{}", serde_json::to_string_pretty(&status)?);
            if let JobStatus::Failed { error } = &status.status {
                anyhow::bail!("Job {} failed: {}", submitted.job_id, error);
            }
        }
    }

    Ok(())
}

fn problem_path(problem: Option<PathBuf>) -> PathBuf {
    problem
        .or_else(|| std::env::var_os("PROBLEM_FILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PROBLEM_FILE))
}

fn load_problem(path: &Path) -> Result<ProblemFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read problem file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse problem file {}", path.display()))
}
