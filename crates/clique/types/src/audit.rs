//! Audit events handed to the audit log collaborator

use crate::ActorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Categories of audited actions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    GroupCreated,
    GroupDiscarded,
    GroupLocked,
    GroupUnlocked,
    StatusChanged,
    MemberAssigned,
    MemberUnassigned,
    MemberDropped,
    MembersSwapped,
    MatchCreated,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::GroupCreated => "group_created",
            AuditAction::GroupDiscarded => "group_discarded",
            AuditAction::GroupLocked => "group_locked",
            AuditAction::GroupUnlocked => "group_unlocked",
            AuditAction::StatusChanged => "status_changed",
            AuditAction::MemberAssigned => "member_assigned",
            AuditAction::MemberUnassigned => "member_unassigned",
            AuditAction::MemberDropped => "member_dropped",
            AuditAction::MembersSwapped => "members_swapped",
            AuditAction::MatchCreated => "match_created",
        }
    }
}

/// One audited change with its before/after values
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditEvent {
    pub timestamp: DateTime<Utc>,
    pub actor: ActorId,
    pub action: AuditAction,
    /// Display form of the affected record (group, participant, ...)
    pub target: String,
    #[serde(default)]
    pub before: Value,
    #[serde(default)]
    pub after: Value,
}

impl AuditEvent {
    pub fn new(actor: ActorId, action: AuditAction, target: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            actor,
            action,
            target: target.into(),
            before: Value::Null,
            after: Value::Null,
        }
    }

    pub fn with_before(mut self, before: Value) -> Self {
        self.before = before;
        self
    }

    pub fn with_after(mut self, after: Value) -> Self {
        self.after = after;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let event = AuditEvent::new(ActorId::new("admin"), AuditAction::StatusChanged, "g-1")
            .with_before(json!("confirmed"))
            .with_after(json!("warming_up"));
        assert_eq!(event.action.as_str(), "status_changed");
        assert_eq!(event.before, json!("confirmed"));
        assert_eq!(event.after, json!("warming_up"));
    }
}
