//! Domain types for the fleet snapshot an invocation works from.
//!
//! A `Group` and its `InstanceRef`s come from the group listing; an
//! `InstanceDetail` comes from a separate, batched launch-metadata lookup.
//! All types are serializable so a fleet can be captured as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider identifier of a compute instance.
pub type InstanceId = String;

/// Name of an autoscaling group, unique within one listing.
pub type GroupName = String;

// ── Tags ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Whether `tags` contains `key`, and when `value` is given, with exactly that value.
///
/// Comparison is case-sensitive.
pub fn has_tag(tags: &[Tag], key: &str, value: Option<&str>) -> bool {
    tags.iter()
        .any(|tag| tag.key == key && value.is_none_or(|v| tag.value == v))
}

/// Value of the first tag with `key`.
pub fn tag_value<'a>(tags: &'a [Tag], key: &str) -> Option<&'a str> {
    tags.iter()
        .find(|tag| tag.key == key)
        .map(|tag| tag.value.as_str())
}

// ── Group ─────────────────────────────────────────────────────────

/// An autoscaling group as seen at listing time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: GroupName,
    pub desired_capacity: u32,
    #[serde(default)]
    pub instances: Vec<InstanceRef>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Group {
    pub fn has_tag(&self, key: &str, value: Option<&str>) -> bool {
        has_tag(&self.tags, key, value)
    }

    pub fn tag_value(&self, key: &str) -> Option<&str> {
        tag_value(&self.tags, key)
    }

    /// Instances that are in service and passing health checks, in listing order.
    pub fn healthy_instances(&self) -> Vec<&InstanceRef> {
        self.instances.iter().filter(|i| i.is_healthy()).collect()
    }
}

// ── Instance ──────────────────────────────────────────────────────

/// Group membership view of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRef {
    pub id: InstanceId,
    pub lifecycle_state: LifecycleState,
    pub health_status: HealthStatus,
}

impl InstanceRef {
    pub fn is_healthy(&self) -> bool {
        self.lifecycle_state == LifecycleState::InService
            && self.health_status == HealthStatus::Healthy
    }
}

/// Lifecycle state of an instance within its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Pending,
    InService,
    Terminating,
    Terminated,
    Detaching,
    Detached,
    EnteringStandby,
    Standby,
    #[serde(other)]
    Unknown,
}

impl LifecycleState {
    /// Map a provider lifecycle string.
    ///
    /// Hook sub-states such as `Pending:Wait` or `Terminating:Proceed`
    /// collapse to their base state.
    pub fn from_provider(s: &str) -> Self {
        let base = s.split(':').next().unwrap_or_default();
        match base {
            "Pending" => Self::Pending,
            "InService" => Self::InService,
            "Terminating" => Self::Terminating,
            "Terminated" => Self::Terminated,
            "Detaching" => Self::Detaching,
            "Detached" => Self::Detached,
            "EnteringStandby" => Self::EnteringStandby,
            "Standby" => Self::Standby,
            _ => Self::Unknown,
        }
    }
}

/// Health as reported by the group's health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    /// Anything other than an exact `Healthy` counts as unhealthy.
    pub fn from_provider(s: &str) -> Self {
        if s == "Healthy" {
            Self::Healthy
        } else {
            Self::Unhealthy
        }
    }
}

/// Launch metadata for an instance, fetched only for health-gate survivors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDetail {
    pub id: InstanceId,
    pub launch_time: DateTime<Utc>,
}
