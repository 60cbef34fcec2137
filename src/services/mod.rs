//! Business logic services

pub mod itinerary;
pub mod job_registry;
pub mod planning;
pub mod route_jobs;
pub mod travel_times;
pub mod vrptw;
