//! StaticFleet — an in-memory fleet backed by a fixed snapshot.
//!
//! Serves group listings and launch metadata from memory and records every
//! lookup and termination request it receives. Faults can be injected per
//! call type so callers can exercise their failure paths. A snapshot can be
//! loaded from JSON to rehearse a run against a captured fleet.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::client::{FleetInventory, FleetMutator};
use crate::error::{FleetError, FleetResult};
use crate::types::*;

/// On-disk layout of a captured fleet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub groups: Vec<Group>,
    #[serde(default)]
    pub instances: Vec<InstanceDetail>,
}

#[derive(Debug, Clone, Default)]
struct Faults {
    listing: Option<String>,
    lookup: HashSet<InstanceId>,
    termination: HashSet<InstanceId>,
}

#[derive(Debug, Default)]
struct CallLog {
    listings: usize,
    lookups: Vec<Vec<InstanceId>>,
    terminations: Vec<InstanceId>,
}

/// In-memory fleet. Clones share the same call log.
#[derive(Debug, Clone, Default)]
pub struct StaticFleet {
    groups: Arc<Vec<Group>>,
    details: Arc<HashMap<InstanceId, InstanceDetail>>,
    faults: Faults,
    calls: Arc<Mutex<CallLog>>,
}

impl StaticFleet {
    pub fn new(groups: Vec<Group>, details: Vec<InstanceDetail>) -> Self {
        let details = details
            .into_iter()
            .map(|detail| (detail.id.clone(), detail))
            .collect();
        Self {
            groups: Arc::new(groups),
            details: Arc::new(details),
            faults: Faults::default(),
            calls: Arc::new(Mutex::new(CallLog::default())),
        }
    }

    pub fn from_snapshot(snapshot: FleetSnapshot) -> Self {
        Self::new(snapshot.groups, snapshot.instances)
    }

    /// Load a JSON [`FleetSnapshot`] from disk.
    pub async fn from_snapshot_file(path: &Path) -> FleetResult<Self> {
        let snapshot_err = |reason: String| FleetError::Snapshot {
            path: path.to_path_buf(),
            reason,
        };
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| snapshot_err(e.to_string()))?;
        let snapshot: FleetSnapshot =
            serde_json::from_slice(&content).map_err(|e| snapshot_err(e.to_string()))?;
        debug!(
            ?path,
            groups = snapshot.groups.len(),
            instances = snapshot.instances.len(),
            "fleet snapshot loaded"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Make every `list_groups` call fail with `reason`.
    pub fn fail_listing(mut self, reason: impl Into<String>) -> Self {
        self.faults.listing = Some(reason.into());
        self
    }

    /// Make any `describe_instances` call that includes `instance_id` fail.
    pub fn fail_lookup_of(mut self, instance_id: impl Into<InstanceId>) -> Self {
        self.faults.lookup.insert(instance_id.into());
        self
    }

    /// Make termination requests for `instance_id` fail.
    pub fn fail_termination_of(mut self, instance_id: impl Into<InstanceId>) -> Self {
        self.faults.termination.insert(instance_id.into());
        self
    }

    pub async fn listing_calls(&self) -> usize {
        self.calls.lock().await.listings
    }

    /// Id batches passed to `describe_instances`, in call order.
    pub async fn lookup_calls(&self) -> Vec<Vec<InstanceId>> {
        self.calls.lock().await.lookups.clone()
    }

    /// Every termination request received, failed ones included.
    pub async fn termination_requests(&self) -> Vec<InstanceId> {
        self.calls.lock().await.terminations.clone()
    }
}

#[async_trait]
impl FleetInventory for StaticFleet {
    async fn list_groups(&self) -> FleetResult<Vec<Group>> {
        self.calls.lock().await.listings += 1;
        if let Some(reason) = &self.faults.listing {
            return Err(FleetError::Listing(reason.clone()));
        }
        Ok(self.groups.as_ref().clone())
    }

    async fn describe_instances(&self, ids: &[InstanceId]) -> FleetResult<Vec<InstanceDetail>> {
        self.calls.lock().await.lookups.push(ids.to_vec());
        if let Some(id) = ids.iter().find(|id| self.faults.lookup.contains(*id)) {
            return Err(FleetError::Describe(format!("lookup of {id} rejected")));
        }
        Ok(ids
            .iter()
            .filter_map(|id| self.details.get(id).cloned())
            .collect())
    }
}

#[async_trait]
impl FleetMutator for StaticFleet {
    async fn terminate_instance(&self, instance_id: &str) -> FleetResult<()> {
        self.calls
            .lock()
            .await
            .terminations
            .push(instance_id.to_string());
        if self.faults.termination.contains(instance_id) {
            return Err(FleetError::Terminate {
                instance_id: instance_id.to_string(),
                reason: "termination rejected".to_string(),
            });
        }
        info!(%instance_id, "termination recorded against static fleet");
        Ok(())
    }
}
