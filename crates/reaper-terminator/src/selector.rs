//! Oldest-selector.
//!
//! One reduction, [`oldest_by`], is applied twice for every unit: over the
//! healthy instances of each member group, then over the per-group winners.
//! A lone group is simply a unit with one member.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use reaper_fleet::{FleetInventory, GroupName, InstanceId, InstanceRef};
use tracing::{debug, warn};

use crate::error::UnitError;

/// Termination candidate with the group it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub group: GroupName,
    pub instance_id: InstanceId,
    pub launch_time: DateTime<Utc>,
    /// Healthy instances of `group` passed over for missing launch metadata.
    pub skipped: usize,
}

/// Element with the smallest key. On equal keys the earliest element wins.
pub fn oldest_by<T, K: Ord>(
    items: impl IntoIterator<Item = T>,
    key: impl FnMut(&T) -> K,
) -> Option<T> {
    items.into_iter().min_by_key(key)
}

/// Oldest candidate across member groups.
pub fn oldest_candidate(candidates: Vec<Candidate>) -> Option<Candidate> {
    oldest_by(candidates, |c| c.launch_time)
}

/// Look up launch times for `healthy` in one batched call and return the
/// oldest, ties broken by listing order.
pub async fn oldest_in_group(
    inventory: &dyn FleetInventory,
    group: &str,
    healthy: &[&InstanceRef],
) -> Result<Candidate, UnitError> {
    let ids: Vec<InstanceId> = healthy.iter().map(|i| i.id.clone()).collect();
    let launch_times: HashMap<InstanceId, DateTime<Utc>> = inventory
        .describe_instances(&ids)
        .await?
        .into_iter()
        .map(|detail| (detail.id, detail.launch_time))
        .collect();

    let candidates: Vec<Candidate> = ids
        .into_iter()
        .filter_map(|id| match launch_times.get(&id) {
            Some(launch_time) => Some(Candidate {
                group: group.to_string(),
                launch_time: *launch_time,
                instance_id: id,
                skipped: 0,
            }),
            None => {
                warn!(%group, instance_id = %id, "no launch metadata for instance, skipping");
                None
            }
        })
        .collect();
    let skipped = healthy.len() - candidates.len();

    let mut oldest = oldest_candidate(candidates)
        .ok_or_else(|| UnitError::NoLaunchMetadata(group.to_string()))?;
    oldest.skipped = skipped;
    debug!(
        %group,
        instance_id = %oldest.instance_id,
        launch_time = %oldest.launch_time,
        skipped,
        "oldest healthy instance in group"
    );
    Ok(oldest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reaper_fleet::{
        FleetError, Group, HealthStatus, InstanceDetail, LifecycleState, StaticFleet,
    };

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn candidate(group: &str, id: &str, secs: i64) -> Candidate {
        Candidate {
            group: group.into(),
            instance_id: id.into(),
            launch_time: at(secs),
            skipped: 0,
        }
    }

    fn instance(id: &str) -> InstanceRef {
        InstanceRef {
            id: id.into(),
            lifecycle_state: LifecycleState::InService,
            health_status: HealthStatus::Healthy,
        }
    }

    fn detail(id: &str, secs: i64) -> InstanceDetail {
        InstanceDetail {
            id: id.into(),
            launch_time: at(secs),
        }
    }

    #[test]
    fn oldest_by_picks_minimum() {
        let picked = oldest_candidate(vec![
            candidate("g", "i-1", 300),
            candidate("g", "i-2", 100),
            candidate("g", "i-3", 200),
        ]);
        assert_eq!(picked.unwrap().instance_id, "i-2");
    }

    #[test]
    fn oldest_by_is_stable_on_ties() {
        let picked = oldest_candidate(vec![
            candidate("g", "i-1", 300),
            candidate("g", "i-2", 100),
            candidate("g", "i-3", 100),
        ]);
        assert_eq!(picked.unwrap().instance_id, "i-2");

        assert_eq!(oldest_by([(1, 'a'), (0, 'b'), (0, 'c')], |p| p.0), Some((0, 'b')));
        assert_eq!(oldest_by(["bb", "a", "c"], |s| s.len()), Some("a"));
    }

    #[test]
    fn oldest_by_is_idempotent() {
        let items = vec![candidate("a", "i-1", 50), candidate("b", "i-2", 10)];
        let once = oldest_candidate(items).unwrap();
        let twice = oldest_candidate(vec![once.clone()]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn oldest_by_empty_is_none() {
        assert_eq!(oldest_candidate(Vec::new()), None);
    }

    #[tokio::test]
    async fn oldest_in_group_uses_one_batched_lookup() {
        let fleet = StaticFleet::new(
            Vec::<Group>::new(),
            vec![detail("i-1", 200), detail("i-2", 100), detail("i-3", 100)],
        );
        let instances = [instance("i-1"), instance("i-2"), instance("i-3")];
        let healthy: Vec<&InstanceRef> = instances.iter().collect();

        let oldest = oldest_in_group(&fleet, "asg", &healthy).await.unwrap();
        assert_eq!(oldest, candidate("asg", "i-2", 100));
        assert_eq!(fleet.lookup_calls().await, vec![vec!["i-1", "i-2", "i-3"]]);
    }

    #[tokio::test]
    async fn oldest_in_group_skips_instances_without_metadata() {
        let fleet = StaticFleet::new(Vec::new(), vec![detail("i-2", 500)]);
        let instances = [instance("i-1"), instance("i-2")];
        let healthy: Vec<&InstanceRef> = instances.iter().collect();

        let oldest = oldest_in_group(&fleet, "asg", &healthy).await.unwrap();
        assert_eq!(oldest.instance_id, "i-2");
        assert_eq!(oldest.skipped, 1);
    }

    #[tokio::test]
    async fn oldest_in_group_without_any_metadata_fails() {
        let fleet = StaticFleet::default();
        let instances = [instance("i-1")];
        let healthy: Vec<&InstanceRef> = instances.iter().collect();

        let err = oldest_in_group(&fleet, "asg", &healthy).await.unwrap_err();
        assert!(matches!(err, UnitError::NoLaunchMetadata(g) if g == "asg"));
    }

    #[tokio::test]
    async fn oldest_in_group_propagates_lookup_errors() {
        let fleet = StaticFleet::new(Vec::new(), vec![detail("i-1", 1)]).fail_lookup_of("i-1");
        let instances = [instance("i-1")];
        let healthy: Vec<&InstanceRef> = instances.iter().collect();

        let err = oldest_in_group(&fleet, "asg", &healthy).await.unwrap_err();
        assert!(matches!(err, UnitError::Lookup(FleetError::Describe(_))));
    }
}
