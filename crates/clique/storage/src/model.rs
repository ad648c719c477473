use chrono::{DateTime, Utc};
use clique_types::{
    ApprovalChange, AuditEvent, Group, GroupId, GroupStatus, LockState, MatchRequestId,
    MemberRole, Membership, ParticipantId, PersistentGroup, TransitionGuard,
};
use serde::{Deserialize, Serialize};

/// Generic query window for paged reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryWindow {
    pub limit: usize,
    pub offset: usize,
}

impl QueryWindow {
    pub fn latest(limit: usize) -> Self {
        Self { limit, offset: 0 }
    }
}

/// Guarded assignment request.
#[derive(Debug, Clone)]
pub struct AssignMember {
    pub group_id: GroupId,
    pub participant_id: ParticipantId,
    pub role: MemberRole,
    /// Only `draft`/`confirmed` groups qualify
    pub require_forming: bool,
    pub at: DateTime<Utc>,
}

/// Result of an assignment.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub membership: Membership,
    /// False when the participant was already an active member
    pub created: bool,
}

/// Both rows after a swap.
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub first: Membership,
    pub second: Membership,
}

/// Lock flag before and after a lock/unlock.
#[derive(Debug, Clone)]
pub struct LockChange {
    pub previous: Option<LockState>,
    pub group: Group,
}

/// Compare-and-set status change.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub group_id: GroupId,
    pub expected_from: GroupStatus,
    pub to: GroupStatus,
    pub guard: TransitionGuard,
    pub approval: ApprovalChange,
    pub at: DateTime<Utc>,
}

/// Outcome of one origin group in a resolver pass.
///
/// Applied only if every listed request is still unprocessed.
#[derive(Debug, Clone)]
pub struct MatchCommit {
    pub request_ids: Vec<MatchRequestId>,
    pub persistent_group: Option<PersistentGroup>,
    pub processed_at: DateTime<Utc>,
}

/// Persistent tamper-evident audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub sequence: u64,
    pub event: AuditEvent,
    pub previous_hash: Option<String>,
    pub hash: String,
}
