//! Error taxonomy for clique operations.
//!
//! Manual operations return these synchronously and leave state untouched
//! when they fail. Batch passes log and count them per unit instead.

use crate::{EventId, GroupId, GroupStatus, ParticipantId};
use thiserror::Error;

/// Errors that can occur in clique formation, lifecycle and matching.
#[derive(Debug, Clone, Error)]
pub enum CliqueError {
    /// The group already holds `capacity` active members.
    #[error("group {group_id} is at capacity ({capacity})")]
    CapacityExceeded { group_id: GroupId, capacity: usize },

    /// The participant holds an active membership in another open group of the event.
    #[error("participant {participant_id} is already assigned to group {group_id}")]
    AlreadyAssigned {
        participant_id: ParticipantId,
        group_id: GroupId,
    },

    /// The group is locked against membership changes.
    #[error("group {0} is locked")]
    GroupLocked(GroupId),

    /// Both swap participants already share a group.
    #[error("participants already share group {0}")]
    SameGroup(GroupId),

    /// The requested status change is not allowed or its guard failed.
    #[error("invalid transition for group {group_id}: {from} -> {to} ({reason})")]
    InvalidTransition {
        group_id: GroupId,
        from: GroupStatus,
        to: GroupStatus,
        reason: String,
    },

    /// The external recommender failed or timed out.
    #[error("recommender unavailable: {0}")]
    RecommenderUnavailable(String),

    #[error("group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("event not found: {0}")]
    EventNotFound(EventId),

    #[error("participant {participant_id} is not a member of {scope}")]
    NotAMember {
        participant_id: ParticipantId,
        scope: String,
    },

    /// The group's status no longer admits the requested membership change.
    #[error("group {group_id} does not accept membership changes while {status}")]
    GroupClosed {
        group_id: GroupId,
        status: GroupStatus,
    },

    /// Readiness signals are only accepted during warm-up and review.
    #[error("group {group_id} does not accept readiness signals while {status}")]
    ReadinessNotOpen {
        group_id: GroupId,
        status: GroupStatus,
    },

    #[error("participant {participant_id} already submitted a match request for group {group_id}")]
    DuplicateMatchRequest {
        participant_id: ParticipantId,
        group_id: GroupId,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A concurrent writer got there first.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl CliqueError {
    /// Shorthand for a rejected transition.
    pub fn invalid_transition(
        group_id: &GroupId,
        from: GroupStatus,
        to: GroupStatus,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            group_id: group_id.clone(),
            from,
            to,
            reason: reason.into(),
        }
    }
}

/// Result type for clique operations.
pub type CliqueResult<T> = Result<T, CliqueError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CliqueError::CapacityExceeded {
            group_id: GroupId::new("g-1"),
            capacity: 4,
        };
        assert_eq!(err.to_string(), "group g-1 is at capacity (4)");

        let err = CliqueError::invalid_transition(
            &GroupId::new("g-1"),
            GroupStatus::Draft,
            GroupStatus::Approved,
            "not allowed",
        );
        assert_eq!(
            err.to_string(),
            "invalid transition for group g-1: draft -> approved (not allowed)"
        );
    }
}
