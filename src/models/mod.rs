//! Data Models
//!
//! Request and response types for the HTTP endpoints.

mod requests;
mod responses;

pub use requests::ApiQuery;
pub use responses::{GroupStatsResponse, HealthResponse, StatsResponse};
