//! Group evaluator: the two safety gates applied to each member group.

use reaper_fleet::{Group, InstanceRef};

use crate::outcome::OutcomeResult;

/// Groups asking for fewer instances than this are never touched.
pub const MIN_DESIRED_CAPACITY: u32 = 2;

/// Why a group may not lose an instance this invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    TooFewInstances { desired_capacity: u32 },
    NotEnoughHealthyInstances { healthy: u32, desired_capacity: u32 },
}

impl GateRejection {
    pub fn into_result(self, group: &str) -> OutcomeResult {
        let group = group.to_string();
        match self {
            Self::TooFewInstances { desired_capacity } => OutcomeResult::TooFewInstances {
                group,
                desired_capacity,
            },
            Self::NotEnoughHealthyInstances {
                healthy,
                desired_capacity,
            } => OutcomeResult::NotEnoughHealthyInstances {
                group,
                healthy,
                desired_capacity,
            },
        }
    }
}

/// Run the capacity gate, then the health gate.
///
/// On success returns the healthy instances in listing order; these are the
/// group's termination candidates.
pub fn check_gates(group: &Group) -> Result<Vec<&InstanceRef>, GateRejection> {
    let desired_capacity = group.desired_capacity;
    if desired_capacity < MIN_DESIRED_CAPACITY {
        return Err(GateRejection::TooFewInstances { desired_capacity });
    }

    let healthy = group.healthy_instances();
    let healthy_count = u32::try_from(healthy.len()).unwrap_or(u32::MAX);
    if healthy_count < desired_capacity {
        return Err(GateRejection::NotEnoughHealthyInstances {
            healthy: healthy_count,
            desired_capacity,
        });
    }

    Ok(healthy)
}
