//! Event groups and their lifecycle status
//!
//! A group moves forward through
//! `draft → confirmed → warming_up → ready_for_review → approved → active → completed`
//! with one side edge, `ready_for_review → warming_up` (hold back). The lock
//! flag is orthogonal: it blocks membership changes, never status changes.

use crate::{ActorId, EventId, GroupId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of an event group
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GroupStatus {
    /// Being assembled by hand
    #[default]
    Draft,
    /// Membership agreed, still editable
    Confirmed,
    /// Members are submitting readiness signals
    WarmingUp,
    /// Every member is ready; waiting on an admin
    ReadyForReview,
    /// Admin approved; instructions released to members
    Approved,
    /// The activity is underway
    Active,
    /// Terminal
    Completed,
}

impl GroupStatus {
    pub const ALL: [GroupStatus; 7] = [
        GroupStatus::Draft,
        GroupStatus::Confirmed,
        GroupStatus::WarmingUp,
        GroupStatus::ReadyForReview,
        GroupStatus::Approved,
        GroupStatus::Active,
        GroupStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupStatus::Draft => "draft",
            GroupStatus::Confirmed => "confirmed",
            GroupStatus::WarmingUp => "warming_up",
            GroupStatus::ReadyForReview => "ready_for_review",
            GroupStatus::Approved => "approved",
            GroupStatus::Active => "active",
            GroupStatus::Completed => "completed",
        }
    }

    /// The transition table. Guards are evaluated separately.
    pub fn allowed_next(&self) -> &'static [GroupStatus] {
        match self {
            GroupStatus::Draft => &[GroupStatus::Confirmed],
            GroupStatus::Confirmed => &[GroupStatus::WarmingUp],
            GroupStatus::WarmingUp => &[GroupStatus::ReadyForReview],
            GroupStatus::ReadyForReview => &[GroupStatus::Approved, GroupStatus::WarmingUp],
            GroupStatus::Approved => &[GroupStatus::Active, GroupStatus::Completed],
            GroupStatus::Active => &[GroupStatus::Completed],
            GroupStatus::Completed => &[],
        }
    }

    pub fn can_transition_to(&self, to: GroupStatus) -> bool {
        self.allowed_next().contains(&to)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GroupStatus::Completed)
    }

    /// Manual assignment is only allowed while the group is still forming
    pub fn is_forming(&self) -> bool {
        matches!(self, GroupStatus::Draft | GroupStatus::Confirmed)
    }

    pub fn accepts_readiness_signals(&self) -> bool {
        matches!(self, GroupStatus::WarmingUp | GroupStatus::ReadyForReview)
    }
}

impl fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who holds the lock and since when
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LockState {
    pub locked_by: ActorId,
    pub locked_at: DateTime<Utc>,
}

impl LockState {
    pub fn new(locked_by: ActorId) -> Self {
        Self {
            locked_by,
            locked_at: Utc::now(),
        }
    }
}

/// Provenance of a recommender-formed group
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FormationProvenance {
    pub reason: String,
    pub compatibility_score: f64,
}

/// Audit of the review approval
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub approved_by: ActorId,
    pub approved_at: DateTime<Utc>,
}

/// What a status change does to the approval record
#[derive(Clone, Debug, PartialEq, Default)]
pub enum ApprovalChange {
    #[default]
    Keep,
    Set(ApprovalRecord),
    Clear,
}

/// An event group (clique)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub event_id: EventId,
    /// `"{event title} {sequence}"`
    pub name: String,
    /// Per-event creation counter; never reused
    pub sequence: u32,
    pub status: GroupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock: Option<LockState>,
    pub target_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formation: Option<FormationProvenance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    /// Materialize a group from its creation request
    pub fn from_new(new_group: NewGroup, title: &str, sequence: u32, now: DateTime<Utc>) -> Self {
        Self {
            id: GroupId::generate(),
            event_id: new_group.event_id,
            name: Self::compose_name(title, sequence),
            sequence,
            status: new_group.status,
            lock: None,
            target_capacity: new_group.target_capacity,
            formation: new_group.formation,
            approval: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn compose_name(title: &str, sequence: u32) -> String {
        format!("{} {}", title, sequence)
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }
}

/// Request to create a group; the store assigns id, sequence and name
#[derive(Clone, Debug)]
pub struct NewGroup {
    pub event_id: EventId,
    pub target_capacity: usize,
    pub status: GroupStatus,
    pub formation: Option<FormationProvenance>,
}

impl NewGroup {
    /// A hand-assembled group
    pub fn draft(event_id: EventId, target_capacity: usize) -> Self {
        Self {
            event_id,
            target_capacity,
            status: GroupStatus::Draft,
            formation: None,
        }
    }

    /// A recommender-formed group
    pub fn recommended(
        event_id: EventId,
        target_capacity: usize,
        provenance: FormationProvenance,
    ) -> Self {
        Self {
            event_id,
            target_capacity,
            status: GroupStatus::Confirmed,
            formation: Some(provenance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path_is_allowed() {
        let path = GroupStatus::ALL;
        for pair in path.windows(2) {
            assert!(
                pair[0].can_transition_to(pair[1]),
                "{} -> {} should be allowed",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_side_and_shortcut_edges() {
        assert!(GroupStatus::ReadyForReview.can_transition_to(GroupStatus::WarmingUp));
        assert!(GroupStatus::Approved.can_transition_to(GroupStatus::Completed));
        assert!(!GroupStatus::Draft.can_transition_to(GroupStatus::WarmingUp));
        assert!(!GroupStatus::WarmingUp.can_transition_to(GroupStatus::Approved));
        assert!(!GroupStatus::Confirmed.can_transition_to(GroupStatus::Draft));
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(GroupStatus::Completed.is_terminal());
        assert!(GroupStatus::Completed.allowed_next().is_empty());
        assert!(GroupStatus::ALL[..6].iter().all(|s| !s.is_terminal()));
    }

    #[test]
    fn test_status_serde_is_snake_case() {
        let json = serde_json::to_string(&GroupStatus::ReadyForReview).unwrap();
        assert_eq!(json, "\"ready_for_review\"");
    }

    #[test]
    fn test_group_naming() {
        let group = Group::from_new(
            NewGroup::draft(EventId::new("ev"), 5),
            "Pottery Night",
            3,
            Utc::now(),
        );
        assert_eq!(group.name, "Pottery Night 3");
        assert_eq!(group.status, GroupStatus::Draft);
        assert!(!group.is_locked());
    }
}
