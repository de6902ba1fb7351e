//! reaper-fleet — fleet model and cloud collaborators for Reaper.
//!
//! Describes autoscaling groups, their instances and launch metadata, and
//! the two seams the terminator talks through:
//!
//! - [`FleetInventory`]: list groups, look up instance launch times
//! - [`FleetMutator`]: ask the provider to terminate one instance
//!
//! # Backends
//!
//! ```text
//! StaticFleet    in-memory / JSON snapshot fleet (tests, offline rehearsal)
//! DryRunMutator  logs the termination it would have requested
//! AwsFleet       Auto Scaling + EC2 APIs (feature "aws")
//! ```

pub mod client;
pub mod dry_run;
pub mod error;
pub mod memory;
pub mod types;

#[cfg(feature = "aws")]
pub mod aws;

#[cfg(feature = "aws")]
pub use aws::AwsFleet;
pub use client::{FleetInventory, FleetMutator};
pub use dry_run::DryRunMutator;
pub use error::{FleetError, FleetResult};
pub use memory::{FleetSnapshot, StaticFleet};
pub use types::*;
