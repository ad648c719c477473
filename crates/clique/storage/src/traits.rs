use crate::model::{
    AssignMember, Assignment, AuditRecord, LockChange, MatchCommit, QueryWindow, StatusChange,
    SwapOutcome,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clique_types::{
    AuditEvent, CliqueResult, EventId, EventRecord, Group, GroupId, LockState, MatchRequest,
    Membership, NewGroup, NewMatchRequest, ParticipantId, PersistentGroup, PersistentGroupId,
    ReadinessUpdate,
};

/// Storage interface for event records.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert or replace an event record.
    async fn upsert_event(&self, event: EventRecord) -> CliqueResult<()>;

    async fn get_event(&self, event_id: &EventId) -> CliqueResult<Option<EventRecord>>;
}

/// Storage interface for event groups.
#[async_trait]
pub trait GroupStore: Send + Sync {
    /// Insert a group, assigning the event's next sequence number and its name.
    async fn create_group(&self, new_group: NewGroup, at: DateTime<Utc>) -> CliqueResult<Group>;

    /// Create a group and seat every member in one step. Nothing is written
    /// if any member fails its guards.
    async fn create_group_with_members(
        &self,
        new_group: NewGroup,
        members: &[ParticipantId],
        at: DateTime<Utc>,
    ) -> CliqueResult<(Group, Vec<Membership>)>;

    async fn get_group(&self, group_id: &GroupId) -> CliqueResult<Option<Group>>;

    /// Groups of an event ordered by sequence.
    async fn list_groups(&self, event_id: &EventId) -> CliqueResult<Vec<Group>>;

    /// Set (`Some`) or clear (`None`) the lock flag.
    async fn set_lock(
        &self,
        group_id: &GroupId,
        lock: Option<LockState>,
        at: DateTime<Utc>,
    ) -> CliqueResult<LockChange>;

    /// Apply a status change if the stored status still equals
    /// `expected_from` and the guard holds.
    async fn transition_status(&self, change: StatusChange) -> CliqueResult<Group>;

    /// Remove an empty draft group. The event's sequence counter is not rewound.
    async fn discard_group(&self, group_id: &GroupId) -> CliqueResult<Group>;
}

/// Storage interface for memberships.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    async fn assign_member(&self, request: AssignMember) -> CliqueResult<Assignment>;

    /// Remove the membership row. `Ok(None)` when there was none.
    async fn unassign_member(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
    ) -> CliqueResult<Option<Membership>>;

    /// Exchange the groups of two participants of one event, both rows or neither.
    async fn swap_members(
        &self,
        event_id: &EventId,
        first: &ParticipantId,
        second: &ParticipantId,
        at: DateTime<Utc>,
    ) -> CliqueResult<SwapOutcome>;

    async fn mark_dropped(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        at: DateTime<Utc>,
    ) -> CliqueResult<Membership>;

    /// Record a readiness signal; the group must accept readiness signals.
    async fn update_readiness(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        update: ReadinessUpdate,
        at: DateTime<Utc>,
    ) -> CliqueResult<Membership>;

    /// Every row of a group (dropped included), ordered by join time.
    async fn list_memberships(&self, group_id: &GroupId) -> CliqueResult<Vec<Membership>>;

    /// The participant's active membership in an open group of the event.
    async fn active_membership(
        &self,
        event_id: &EventId,
        participant_id: &ParticipantId,
    ) -> CliqueResult<Option<Membership>>;
}

/// Storage interface for keep-in-touch requests and persistent groups.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Store a request, rejecting a second one per requester and origin group.
    async fn insert_match_request(
        &self,
        request: NewMatchRequest,
        at: DateTime<Utc>,
    ) -> CliqueResult<MatchRequest>;

    /// Unprocessed requests that want to keep someone, in submission order.
    async fn pending_match_requests(&self) -> CliqueResult<Vec<MatchRequest>>;

    async fn list_match_requests(&self, origin_group_id: &GroupId)
        -> CliqueResult<Vec<MatchRequest>>;

    /// Insert the persistent group (if any) and mark every request processed,
    /// or fail with `Conflict` if a request was already processed.
    async fn commit_match_outcome(&self, commit: MatchCommit) -> CliqueResult<()>;

    async fn get_persistent_group(
        &self,
        id: &PersistentGroupId,
    ) -> CliqueResult<Option<PersistentGroup>>;

    async fn list_persistent_groups(&self) -> CliqueResult<Vec<PersistentGroup>>;
}

/// Storage interface for append-only audit events.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append an event and return the hash-linked stored record.
    async fn append_audit(&self, event: AuditEvent) -> CliqueResult<AuditRecord>;

    /// Read records newest-first.
    async fn list_audit(&self, window: QueryWindow) -> CliqueResult<Vec<AuditRecord>>;
}

/// Unified storage bundle used by the clique engine.
pub trait CliqueStorage:
    EventStore + GroupStore + MembershipStore + MatchStore + AuditStore + Send + Sync
{
}

impl<T> CliqueStorage for T where
    T: EventStore + GroupStore + MembershipStore + MatchStore + AuditStore + Send + Sync
{
}
