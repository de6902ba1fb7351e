//! Terminator — the invocation entry point.
//!
//! Lists the fleet once, partitions eligible groups into elimination units,
//! evaluates every unit as its own task and gathers one outcome per unit.
//! Units share nothing mutable; a failure inside one unit becomes that
//! unit's outcome and never cancels its siblings.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join_all;
use reaper_core::TagsConfig;
use reaper_fleet::{FleetInventory, FleetMutator};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::eligibility::filter_eligible;
use crate::error::{TerminatorError, TerminatorResult};
use crate::evaluator::check_gates;
use crate::grouping::{partition, EliminationUnit};
use crate::outcome::{Outcome, OutcomeResult};
use crate::selector::{oldest_candidate, oldest_in_group};

/// Terminates the oldest healthy instance of every eligible unit.
#[derive(Clone)]
pub struct Terminator {
    inventory: Arc<dyn FleetInventory>,
    mutator: Arc<dyn FleetMutator>,
    tags: TagsConfig,
}

impl Terminator {
    pub fn new(
        inventory: Arc<dyn FleetInventory>,
        mutator: Arc<dyn FleetMutator>,
        tags: TagsConfig,
    ) -> Self {
        Self {
            inventory,
            mutator,
            tags,
        }
    }

    /// Run one invocation.
    ///
    /// Fails only when the group listing fails (nothing is evaluated then)
    /// or an evaluation task dies; otherwise returns one outcome per unit in
    /// completion order.
    pub async fn run(&self) -> TerminatorResult<Vec<Outcome>> {
        let groups = self.inventory.list_groups().await.map_err(|e| {
            error!(error = %e, "failed to list autoscaling groups");
            TerminatorError::Listing(e)
        })?;
        let listed = groups.len();

        let eligible = filter_eligible(groups, &self.tags);
        let eligible_count = eligible.len();
        let units = partition(eligible, &self.tags.grouping_key);
        info!(
            listed,
            eligible = eligible_count,
            units = units.len(),
            "evaluating elimination units"
        );

        let mut tasks = JoinSet::new();
        for unit in units {
            let inventory = Arc::clone(&self.inventory);
            let mutator = Arc::clone(&self.mutator);
            tasks.spawn(async move {
                evaluate_unit(unit, inventory.as_ref(), mutator.as_ref()).await
            });
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined?);
        }

        let terminated = outcomes
            .iter()
            .filter(|o| o.terminated_instance_id().is_some())
            .count();
        info!(units = outcomes.len(), terminated, "invocation complete");
        Ok(outcomes)
    }

    /// Invoke [`run`](Self::run) immediately and then every `interval` until
    /// `shutdown` changes.
    pub async fn run_every(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "terminator started");

        // tokio panics on a zero period.
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.run().await {
                        error!(error = %e, "terminator invocation failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("terminator shutting down");
                    break;
                }
            }
        }
    }
}

async fn evaluate_unit(
    unit: EliminationUnit,
    inventory: &dyn FleetInventory,
    mutator: &dyn FleetMutator,
) -> Outcome {
    let result = decide(&unit, inventory, mutator).await;
    Outcome::new(unit.label(), unit.kind(), result)
}

async fn decide(
    unit: &EliminationUnit,
    inventory: &dyn FleetInventory,
    mutator: &dyn FleetMutator,
) -> OutcomeResult {
    let label = unit.label();

    if let EliminationUnit::Bound { members, .. } = unit
        && members.len() < 2
    {
        let group = members.first().map(|g| g.name.clone()).unwrap_or_default();
        warn!(termination_group = %label, %group, "grouping tag attached to a single group");
        return OutcomeResult::SingleMemberGroup { group };
    }

    let mut eligible = Vec::with_capacity(unit.members().len());
    for group in unit.members() {
        match check_gates(group) {
            Ok(healthy) => eligible.push((group, healthy)),
            Err(rejection) => {
                debug!(
                    unit = %label,
                    group = %group.name,
                    ?rejection,
                    "group failed eligibility gate"
                );
                return rejection.into_result(&group.name);
            }
        }
    }

    let lookups = eligible
        .iter()
        .map(|(group, healthy)| oldest_in_group(inventory, &group.name, healthy));
    let per_group = match try_join_all(lookups).await {
        Ok(per_group) => per_group,
        Err(e) => {
            warn!(unit = %label, error = %e, "oldest instance lookup failed");
            return OutcomeResult::LookupFailed {
                error: e.to_string(),
            };
        }
    };

    let skipped: usize = per_group.iter().map(|c| c.skipped).sum();
    if skipped > 0 {
        warn!(
            unit = %label,
            skipped,
            "instances without launch metadata were left out of the selection"
        );
    }

    // Unreachable: every unit has a member past the gates, and each member
    // lookup yields a candidate or an error.
    let Some(oldest) = oldest_candidate(per_group) else {
        return OutcomeResult::LookupFailed {
            error: format!("no candidates in {label}"),
        };
    };

    info!(
        unit = %label,
        group = %oldest.group,
        instance_id = %oldest.instance_id,
        launch_time = %oldest.launch_time,
        skipped,
        "terminating oldest instance"
    );
    match mutator.terminate_instance(&oldest.instance_id).await {
        Ok(()) => OutcomeResult::Terminated {
            instance_id: oldest.instance_id,
            group: oldest.group,
        },
        Err(e) => {
            warn!(
                unit = %label,
                instance_id = %oldest.instance_id,
                error = %e,
                "termination request failed"
            );
            OutcomeResult::TerminationFailed {
                instance_id: oldest.instance_id,
                group: oldest.group,
                error: e.to_string(),
            }
        }
    }
}
