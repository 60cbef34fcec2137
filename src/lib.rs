//! School bus route worker
//!
//! Plans a single-vehicle school route with pickup time windows: greedy
//! construction followed by iterated 2-opt local search.

pub mod config;
pub mod defaults;
pub mod services;
pub mod types;
