//! Error types for placement requests.
//!
//! [`place`](crate::place) itself never fails; errors only arise while
//! loading and validating a request file.

use thiserror::Error;

/// Result type alias for request handling.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors that can occur while reading a placement request.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read request file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse request: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("zone listed more than once: {0}")]
    DuplicateZone(String),

    #[error("instance listed more than once: {0}")]
    DuplicateInstance(String),
}
