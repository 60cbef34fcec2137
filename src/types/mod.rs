//! Type definitions

pub mod job;
pub mod request;
pub mod route;

pub use job::*;
pub use request::*;
pub use route::*;
