//! Terminator error types.

use reaper_fleet::{FleetError, GroupName};
use thiserror::Error;

/// Invocation-level failures. Any of these means no outcome list.
#[derive(Debug, Error)]
pub enum TerminatorError {
    #[error("fleet listing failed: {0}")]
    Listing(#[from] FleetError),

    #[error("unit evaluation task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type TerminatorResult<T> = Result<T, TerminatorError>;

/// Failure while picking the oldest instance of one unit.
///
/// Reported as that unit's outcome; sibling units are unaffected.
#[derive(Debug, Error)]
pub enum UnitError {
    #[error("instance lookup failed: {0}")]
    Lookup(#[from] FleetError),

    #[error("no launch metadata returned for healthy instances of {0}")]
    NoLaunchMetadata(GroupName),
}
