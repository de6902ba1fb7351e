//! Error types for fleet collaborators.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for fleet operations.
pub type FleetResult<T> = Result<T, FleetError>;

/// Errors surfaced by an inventory or mutation backend.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("failed to list autoscaling groups: {0}")]
    Listing(String),

    #[error("failed to describe instances: {0}")]
    Describe(String),

    #[error("failed to terminate instance {instance_id}: {reason}")]
    Terminate { instance_id: String, reason: String },

    #[error("failed to load fleet snapshot {path}: {reason}")]
    Snapshot { path: PathBuf, reason: String },
}
