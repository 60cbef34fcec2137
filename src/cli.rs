//! CLI argument parsing for the schoolbus-worker binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use schoolbus_worker::services::itinerary::parse_clock;
use schoolbus_worker::services::vrptw::Minutes;

#[derive(Parser)]
#[command(name = "schoolbus-worker", about = "School bus route optimization worker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Plan a route from a problem file and print it (default if no subcommand given)
    Solve {
        /// Problem file: request plus travel-time matrix, JSON
        #[arg(long)]
        problem: Option<PathBuf>,

        /// Fixed random seed for a reproducible search
        #[arg(long)]
        seed: Option<u64>,

        /// Number of search iterations
        #[arg(long)]
        iterations: Option<usize>,

        /// Random swaps applied per iteration
        #[arg(long)]
        perturbation: Option<usize>,

        /// Override the class time, HH:MM
        #[arg(long, value_parser = parse_class_time)]
        class_time: Option<Minutes>,
    },
    /// Submit the problem as a background job and poll until it finishes
    Submit {
        /// Problem file: request plus travel-time matrix, JSON
        #[arg(long)]
        problem: Option<PathBuf>,

        /// Poll interval in milliseconds
        #[arg(long, default_value_t = 100)]
        poll_ms: u64,
    },
}

fn parse_class_time(raw: &str) -> Result<Minutes, String> {
    parse_clock(raw).ok_or_else(|| format!("expected HH:MM, got {:?}", raw))
}
