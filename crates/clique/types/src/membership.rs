//! Memberships: who sits in which group
//!
//! A membership row links one participant to one group of one event. Swaps
//! rewrite the group reference in place; only an explicit unassign removes
//! the row.

use crate::{EventId, GroupId, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a member inside a group
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    #[default]
    Member,
    /// A named functional role (e.g. "driver", "host")
    Functional(String),
}

/// Whether the membership still counts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    #[default]
    Active,
    /// Kept on record but excluded from rosters, capacity and readiness
    Dropped,
}

/// A participant's warm-up readiness signal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct ReadinessState {
    /// Free-form warm-up response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Explicit "I'm ready" confirmation
    pub confirmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ReadinessState {
    pub fn has_response(&self) -> bool {
        self.response
            .as_deref()
            .map(|r| !r.trim().is_empty())
            .unwrap_or(false)
    }

    /// Both a response and a confirmation are required
    pub fn is_ready(&self) -> bool {
        self.has_response() && self.confirmed
    }

    pub fn apply(&mut self, update: ReadinessUpdate, now: DateTime<Utc>) {
        match update {
            ReadinessUpdate::Response(text) => self.response = Some(text),
            ReadinessUpdate::Confirm => self.confirmed = true,
        }
        self.updated_at = Some(now);
    }
}

/// One readiness signal from a participant
#[derive(Clone, Debug, PartialEq)]
pub enum ReadinessUpdate {
    Response(String),
    Confirm,
}

/// A participant's seat in a group
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Membership {
    pub event_id: EventId,
    pub group_id: GroupId,
    pub participant_id: ParticipantId,
    pub role: MemberRole,
    pub status: MembershipStatus,
    pub readiness: ReadinessState,
    /// When the participant joined their current group
    pub joined_at: DateTime<Utc>,
}

impl Membership {
    pub fn new(
        event_id: EventId,
        group_id: GroupId,
        participant_id: ParticipantId,
        joined_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event_id,
            group_id,
            participant_id,
            role: MemberRole::Member,
            status: MembershipStatus::Active,
            readiness: ReadinessState::default(),
            joined_at,
        }
    }

    pub fn with_role(mut self, role: MemberRole) -> Self {
        self.role = role;
        self
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, MembershipStatus::Active)
    }

    /// Move this record to another group, resetting warm-up state
    pub fn relocate(&mut self, group_id: GroupId, now: DateTime<Utc>) {
        self.group_id = group_id;
        self.joined_at = now;
        self.readiness = ReadinessState::default();
    }
}
