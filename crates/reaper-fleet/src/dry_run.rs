//! Mutator that only reports what it would terminate.

use async_trait::async_trait;
use tracing::info;

use crate::client::FleetMutator;
use crate::error::FleetResult;

#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunMutator;

#[async_trait]
impl FleetMutator for DryRunMutator {
    async fn terminate_instance(&self, instance_id: &str) -> FleetResult<()> {
        info!(%instance_id, "dry run: skipping termination request");
        Ok(())
    }
}
