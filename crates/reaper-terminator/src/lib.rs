//! reaper-terminator — periodic oldest-instance elimination.
//!
//! Each invocation lists every autoscaling group, keeps the ones carrying
//! the eligibility tag, and terminates at most one instance per elimination
//! unit: the oldest healthy instance of a group, or for groups bound by a
//! shared grouping tag, the oldest across the whole bound set.
//!
//! # Algorithm
//!
//! ```text
//! groups   = inventory.list_groups()            // failure aborts the run
//! eligible = groups with tag (eligibility_key = eligibility_value)
//! units    = one per ungrouped group
//!          + one per distinct grouping_key value
//!
//! for each unit, concurrently:
//!     bound unit with one member      -> SingleMemberGroup
//!     any member desired_capacity < 2 -> TooFewInstances
//!     any member healthy < desired    -> NotEnoughHealthyInstances
//!     per member: oldest healthy instance (one batched launch-time lookup)
//!     across members: oldest of those
//!     mutator.terminate_instance(oldest)
//! ```
//!
//! Every unit yields exactly one [`Outcome`]; outcomes arrive in completion
//! order.

pub mod eligibility;
pub mod error;
pub mod evaluator;
pub mod grouping;
pub mod outcome;
pub mod selector;
pub mod terminator;

pub use error::{TerminatorError, TerminatorResult, UnitError};
pub use grouping::EliminationUnit;
pub use outcome::{Outcome, OutcomeResult, UnitKind};
pub use selector::Candidate;
pub use terminator::Terminator;
