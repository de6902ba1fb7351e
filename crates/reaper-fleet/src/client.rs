//! Collaborator seams between the terminator and a cloud provider.

use async_trait::async_trait;

use crate::error::FleetResult;
use crate::types::{Group, InstanceDetail, InstanceId};

/// Read side of the fleet.
#[async_trait]
pub trait FleetInventory: Send + Sync {
    /// Every autoscaling group visible to the caller, untagged ones included.
    ///
    /// Tag filtering is the caller's job.
    async fn list_groups(&self) -> FleetResult<Vec<Group>>;

    /// Launch metadata for `ids`, in any order.
    ///
    /// Unknown ids may be omitted from the result; callers match by id.
    async fn describe_instances(&self, ids: &[InstanceId]) -> FleetResult<Vec<InstanceDetail>>;
}

/// Write side of the fleet.
#[async_trait]
pub trait FleetMutator: Send + Sync {
    /// Ask the provider to terminate `instance_id` without lowering the
    /// group's desired capacity, so the group launches a replacement.
    async fn terminate_instance(&self, instance_id: &str) -> FleetResult<()>;
}
