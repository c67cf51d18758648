use thiserror::Error;

/// Application fault taxonomy. Every public operation returns one of
/// these instead of letting a fault escape its boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("io failure: {0}")]
    Io(String),
    #[error("upstream unavailable: {0}")]
    Upstream(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
