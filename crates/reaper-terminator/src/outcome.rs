//! Per-unit results returned by an invocation.

use reaper_fleet::{GroupName, InstanceId};
use serde::Serialize;

/// Whether a unit is a lone group or a set bound by the grouping tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Group,
    TerminationGroup,
}

/// What happened to one elimination unit.
///
/// Gate rejections name the member group that failed the gate; termination
/// results name the group that owned the chosen instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum OutcomeResult {
    TooFewInstances {
        group: GroupName,
        desired_capacity: u32,
    },
    NotEnoughHealthyInstances {
        group: GroupName,
        healthy: u32,
        desired_capacity: u32,
    },
    /// Grouping tag value carried by only one group.
    SingleMemberGroup { group: GroupName },
    Terminated {
        instance_id: InstanceId,
        group: GroupName,
    },
    /// The oldest instance was chosen but the provider rejected the request.
    TerminationFailed {
        instance_id: InstanceId,
        group: GroupName,
        error: String,
    },
    LookupFailed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Outcome {
    /// Group name, or grouping tag value for a termination group.
    pub label: String,
    pub kind: UnitKind,
    #[serde(flatten)]
    pub result: OutcomeResult,
}

impl Outcome {
    pub fn new(label: impl Into<String>, kind: UnitKind, result: OutcomeResult) -> Self {
        Self {
            label: label.into(),
            kind,
            result,
        }
    }

    /// Id of the instance a termination request succeeded for.
    pub fn terminated_instance_id(&self) -> Option<&str> {
        match &self.result {
            OutcomeResult::Terminated { instance_id, .. } => Some(instance_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_flat_with_result_tag() {
        let outcome = Outcome::new(
            "web",
            UnitKind::TerminationGroup,
            OutcomeResult::Terminated {
                instance_id: "i-1".into(),
                group: "web-a".into(),
            },
        );
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "label": "web",
                "kind": "termination_group",
                "result": "terminated",
                "instance_id": "i-1",
                "group": "web-a",
            })
        );
    }

    #[test]
    fn only_terminated_reports_instance_id() {
        let terminated = Outcome::new(
            "asg",
            UnitKind::Group,
            OutcomeResult::Terminated {
                instance_id: "i-1".into(),
                group: "asg".into(),
            },
        );
        let failed = Outcome::new(
            "asg",
            UnitKind::Group,
            OutcomeResult::TerminationFailed {
                instance_id: "i-1".into(),
                group: "asg".into(),
                error: "denied".into(),
            },
        );
        assert_eq!(terminated.terminated_instance_id(), Some("i-1"));
        assert_eq!(failed.terminated_instance_id(), None);
    }
}
