//! Grouping resolver: turns eligible groups into elimination units.
//!
//! Groups without the grouping tag each form their own unit. Groups that
//! carry it are bound into one unit per distinct tag value.

use std::collections::BTreeMap;

use reaper_fleet::Group;

use crate::outcome::UnitKind;

/// Scope within which at most one instance is terminated per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EliminationUnit {
    Single(Group),
    /// Groups sharing a grouping tag value. Fewer than two members is a
    /// misconfiguration and is never evaluated for termination.
    Bound { name: String, members: Vec<Group> },
}

impl EliminationUnit {
    pub fn label(&self) -> &str {
        match self {
            Self::Single(group) => &group.name,
            Self::Bound { name, .. } => name,
        }
    }

    pub fn kind(&self) -> UnitKind {
        match self {
            Self::Single(_) => UnitKind::Group,
            Self::Bound { .. } => UnitKind::TerminationGroup,
        }
    }

    pub fn members(&self) -> &[Group] {
        match self {
            Self::Single(group) => std::slice::from_ref(group),
            Self::Bound { members, .. } => members,
        }
    }
}

/// Partition `groups` by the value of `grouping_key`.
///
/// Ungrouped units come first in listing order, then bound units ordered by
/// tag value. Member order within a bound unit follows listing order.
pub fn partition(groups: Vec<Group>, grouping_key: &str) -> Vec<EliminationUnit> {
    let mut units = Vec::new();
    let mut bound: BTreeMap<String, Vec<Group>> = BTreeMap::new();

    for group in groups {
        match group.tag_value(grouping_key).map(str::to_owned) {
            Some(name) => bound.entry(name).or_default().push(group),
            None => units.push(EliminationUnit::Single(group)),
        }
    }

    units.extend(
        bound
            .into_iter()
            .map(|(name, members)| EliminationUnit::Bound { name, members }),
    );
    units
}
