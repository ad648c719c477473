//! In-memory reference implementation of the clique storage traits.
//!
//! All tables live behind one `RwLock`, so every guarded mutation is a
//! single critical section. The whole state can be exported and re-imported
//! as a [`StoreSnapshot`], which is how the CLI persists between runs.

use crate::model::{
    AssignMember, Assignment, AuditRecord, LockChange, MatchCommit, QueryWindow, StatusChange,
    SwapOutcome,
};
use crate::traits::{AuditStore, EventStore, GroupStore, MatchStore, MembershipStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clique_types::rules::{
    ensure_accepts_members, ensure_capacity, ensure_exclusive, ensure_swappable, ensure_unlocked,
};
use clique_types::{
    ApprovalChange, AuditEvent, CliqueError, CliqueResult, EventId, EventRecord, Group, GroupId,
    GroupStatus, LockState, MatchRequest, MemberRole, Membership, MembershipStatus, NewGroup,
    NewMatchRequest, ParticipantId, PersistentGroup, PersistentGroupId, ReadinessState,
    ReadinessUpdate,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Serializable image of the whole store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub events: BTreeMap<EventId, EventRecord>,
    /// Groups ever created per event (not rewound by discards)
    #[serde(default)]
    pub group_sequences: BTreeMap<EventId, u32>,
    #[serde(default)]
    pub groups: BTreeMap<GroupId, Group>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
    #[serde(default)]
    pub match_requests: Vec<MatchRequest>,
    #[serde(default)]
    pub persistent_groups: Vec<PersistentGroup>,
    #[serde(default)]
    pub audit: Vec<AuditRecord>,
}

impl StoreSnapshot {
    fn group(&self, group_id: &GroupId) -> CliqueResult<&Group> {
        self.groups
            .get(group_id)
            .ok_or_else(|| CliqueError::GroupNotFound(group_id.clone()))
    }

    fn active_count(&self, group_id: &GroupId) -> usize {
        self.memberships
            .iter()
            .filter(|m| &m.group_id == group_id && m.is_active())
            .count()
    }

    fn group_rows(&self, group_id: &GroupId) -> Vec<Membership> {
        self.memberships
            .iter()
            .filter(|m| &m.group_id == group_id)
            .cloned()
            .collect()
    }

    /// Index of the participant's active membership in an open group of the event
    fn holding_index(&self, event_id: &EventId, participant_id: &ParticipantId) -> Option<usize> {
        self.memberships.iter().position(|m| {
            &m.event_id == event_id
                && &m.participant_id == participant_id
                && m.is_active()
                && self
                    .groups
                    .get(&m.group_id)
                    .map(|g| !g.status.is_terminal())
                    .unwrap_or(false)
        })
    }

    fn holding(&self, event_id: &EventId, participant_id: &ParticipantId) -> Option<&Membership> {
        self.holding_index(event_id, participant_id)
            .map(|idx| &self.memberships[idx])
    }

    /// The participant's row in the group, active row first
    fn row_index(&self, group_id: &GroupId, participant_id: &ParticipantId) -> Option<usize> {
        let matches = |m: &Membership| &m.group_id == group_id && &m.participant_id == participant_id;
        self.memberships
            .iter()
            .position(|m| matches(m) && m.is_active())
            .or_else(|| self.memberships.iter().position(matches))
    }

    fn next_sequence(&mut self, event_id: &EventId) -> u32 {
        let existing = self
            .groups
            .values()
            .filter(|g| &g.event_id == event_id)
            .count() as u32;
        let counter = self.group_sequences.entry(event_id.clone()).or_insert(0);
        *counter = (*counter).max(existing) + 1;
        *counter
    }

    fn event_title(&self, event_id: &EventId) -> CliqueResult<String> {
        self.events
            .get(event_id)
            .map(|e| e.title.clone())
            .ok_or_else(|| CliqueError::EventNotFound(event_id.clone()))
    }

    fn seat(
        &mut self,
        group: &Group,
        participant_id: &ParticipantId,
        role: MemberRole,
        require_forming: bool,
        at: DateTime<Utc>,
    ) -> CliqueResult<Assignment> {
        ensure_accepts_members(group, require_forming)?;

        if let Some(idx) = self.row_index(&group.id, participant_id) {
            if self.memberships[idx].is_active() {
                return Ok(Assignment {
                    membership: self.memberships[idx].clone(),
                    created: false,
                });
            }
            ensure_exclusive(
                participant_id,
                group,
                self.holding(&group.event_id, participant_id),
            )?;
            ensure_capacity(group, self.active_count(&group.id))?;

            let row = &mut self.memberships[idx];
            row.status = MembershipStatus::Active;
            row.role = role;
            row.readiness = ReadinessState::default();
            row.joined_at = at;
            return Ok(Assignment {
                membership: row.clone(),
                created: true,
            });
        }

        ensure_exclusive(
            participant_id,
            group,
            self.holding(&group.event_id, participant_id),
        )?;
        ensure_capacity(group, self.active_count(&group.id))?;

        let membership = Membership::new(
            group.event_id.clone(),
            group.id.clone(),
            participant_id.clone(),
            at,
        )
        .with_role(role);
        self.memberships.push(membership.clone());
        Ok(Assignment {
            membership,
            created: true,
        })
    }
}

/// In-memory clique storage adapter.
#[derive(Debug, Default)]
pub struct InMemoryCliqueStorage {
    state: RwLock<StoreSnapshot>,
}

impl InMemoryCliqueStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from an exported snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            state: RwLock::new(snapshot),
        }
    }

    /// Export the current state.
    pub fn snapshot(&self) -> CliqueResult<StoreSnapshot> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> CliqueResult<RwLockReadGuard<'_, StoreSnapshot>> {
        self.state
            .read()
            .map_err(|_| CliqueError::Storage("clique state lock poisoned".to_string()))
    }

    fn write(&self) -> CliqueResult<RwLockWriteGuard<'_, StoreSnapshot>> {
        self.state
            .write()
            .map_err(|_| CliqueError::Storage("clique state lock poisoned".to_string()))
    }
}

#[async_trait]
impl EventStore for InMemoryCliqueStorage {
    async fn upsert_event(&self, event: EventRecord) -> CliqueResult<()> {
        let mut guard = self.write()?;
        guard.events.insert(event.id.clone(), event);
        Ok(())
    }

    async fn get_event(&self, event_id: &EventId) -> CliqueResult<Option<EventRecord>> {
        Ok(self.read()?.events.get(event_id).cloned())
    }
}

#[async_trait]
impl GroupStore for InMemoryCliqueStorage {
    async fn create_group(&self, new_group: NewGroup, at: DateTime<Utc>) -> CliqueResult<Group> {
        let mut guard = self.write()?;
        let title = guard.event_title(&new_group.event_id)?;
        let sequence = guard.next_sequence(&new_group.event_id);
        let group = Group::from_new(new_group, &title, sequence, at);
        guard.groups.insert(group.id.clone(), group.clone());
        Ok(group)
    }

    async fn create_group_with_members(
        &self,
        new_group: NewGroup,
        members: &[ParticipantId],
        at: DateTime<Utc>,
    ) -> CliqueResult<(Group, Vec<Membership>)> {
        let mut guard = self.write()?;
        let title = guard.event_title(&new_group.event_id)?;

        if members.len() > new_group.target_capacity {
            return Err(CliqueError::InvalidInput(format!(
                "{} members exceed target capacity {}",
                members.len(),
                new_group.target_capacity
            )));
        }
        let mut seen = HashSet::new();
        for participant_id in members {
            if !seen.insert(participant_id) {
                return Err(CliqueError::InvalidInput(format!(
                    "participant {} listed twice",
                    participant_id
                )));
            }
            if let Some(current) = guard.holding(&new_group.event_id, participant_id) {
                return Err(CliqueError::AlreadyAssigned {
                    participant_id: participant_id.clone(),
                    group_id: current.group_id.clone(),
                });
            }
        }

        let sequence = guard.next_sequence(&new_group.event_id);
        let group = Group::from_new(new_group, &title, sequence, at);
        let memberships: Vec<Membership> = members
            .iter()
            .map(|p| Membership::new(group.event_id.clone(), group.id.clone(), p.clone(), at))
            .collect();

        guard.groups.insert(group.id.clone(), group.clone());
        guard.memberships.extend(memberships.iter().cloned());
        Ok((group, memberships))
    }

    async fn get_group(&self, group_id: &GroupId) -> CliqueResult<Option<Group>> {
        Ok(self.read()?.groups.get(group_id).cloned())
    }

    async fn list_groups(&self, event_id: &EventId) -> CliqueResult<Vec<Group>> {
        let guard = self.read()?;
        let mut groups: Vec<Group> = guard
            .groups
            .values()
            .filter(|g| &g.event_id == event_id)
            .cloned()
            .collect();
        groups.sort_by_key(|g| g.sequence);
        Ok(groups)
    }

    async fn set_lock(
        &self,
        group_id: &GroupId,
        lock: Option<LockState>,
        at: DateTime<Utc>,
    ) -> CliqueResult<LockChange> {
        let mut guard = self.write()?;
        let group = guard
            .groups
            .get_mut(group_id)
            .ok_or_else(|| CliqueError::GroupNotFound(group_id.clone()))?;
        let previous = std::mem::replace(&mut group.lock, lock);
        group.updated_at = at;
        Ok(LockChange {
            previous,
            group: group.clone(),
        })
    }

    async fn transition_status(&self, change: StatusChange) -> CliqueResult<Group> {
        let mut guard = self.write()?;
        let rows = guard.group_rows(&change.group_id);
        let group = guard
            .groups
            .get_mut(&change.group_id)
            .ok_or_else(|| CliqueError::GroupNotFound(change.group_id.clone()))?;

        if group.status != change.expected_from {
            return Err(CliqueError::invalid_transition(
                &change.group_id,
                group.status,
                change.to,
                format!(
                    "expected status {}, found {}",
                    change.expected_from, group.status
                ),
            ));
        }
        if !group.status.can_transition_to(change.to) {
            return Err(CliqueError::invalid_transition(
                &change.group_id,
                group.status,
                change.to,
                "transition not allowed",
            ));
        }
        change.guard.check(group, &rows).map_err(|reason| {
            CliqueError::invalid_transition(&change.group_id, group.status, change.to, reason)
        })?;

        match change.approval {
            ApprovalChange::Keep => {}
            ApprovalChange::Set(record) => group.approval = Some(record),
            ApprovalChange::Clear => group.approval = None,
        }
        group.status = change.to;
        group.updated_at = change.at;
        Ok(group.clone())
    }

    async fn discard_group(&self, group_id: &GroupId) -> CliqueResult<Group> {
        let mut guard = self.write()?;
        let group = guard.group(group_id)?;
        if group.status != GroupStatus::Draft {
            return Err(CliqueError::GroupClosed {
                group_id: group_id.clone(),
                status: group.status,
            });
        }
        if guard.memberships.iter().any(|m| &m.group_id == group_id) {
            return Err(CliqueError::Conflict(format!(
                "group {} still has memberships",
                group_id
            )));
        }
        guard
            .groups
            .remove(group_id)
            .ok_or_else(|| CliqueError::GroupNotFound(group_id.clone()))
    }
}

#[async_trait]
impl MembershipStore for InMemoryCliqueStorage {
    async fn assign_member(&self, request: AssignMember) -> CliqueResult<Assignment> {
        let mut guard = self.write()?;
        let group = guard.group(&request.group_id)?.clone();
        guard.seat(
            &group,
            &request.participant_id,
            request.role,
            request.require_forming,
            request.at,
        )
    }

    async fn unassign_member(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
    ) -> CliqueResult<Option<Membership>> {
        let mut guard = self.write()?;
        let Some(idx) = guard.row_index(group_id, participant_id) else {
            return Ok(None);
        };
        let group = guard.group(group_id)?;
        if group.status.is_terminal() {
            return Err(CliqueError::GroupClosed {
                group_id: group_id.clone(),
                status: group.status,
            });
        }
        ensure_unlocked(group)?;
        Ok(Some(guard.memberships.remove(idx)))
    }

    async fn swap_members(
        &self,
        event_id: &EventId,
        first: &ParticipantId,
        second: &ParticipantId,
        at: DateTime<Utc>,
    ) -> CliqueResult<SwapOutcome> {
        if first == second {
            return Err(CliqueError::InvalidInput(
                "cannot swap a participant with themselves".to_string(),
            ));
        }

        let mut guard = self.write()?;
        let not_member = |participant_id: &ParticipantId| CliqueError::NotAMember {
            participant_id: participant_id.clone(),
            scope: format!("any open group of event {}", event_id),
        };
        let first_idx = guard
            .holding_index(event_id, first)
            .ok_or_else(|| not_member(first))?;
        let second_idx = guard
            .holding_index(event_id, second)
            .ok_or_else(|| not_member(second))?;

        let first_group = guard.group(&guard.memberships[first_idx].group_id)?.clone();
        let second_group = guard.group(&guard.memberships[second_idx].group_id)?.clone();
        ensure_swappable(
            &guard.memberships[first_idx],
            &first_group,
            &guard.memberships[second_idx],
            &second_group,
        )?;

        guard.memberships[first_idx].relocate(second_group.id.clone(), at);
        guard.memberships[second_idx].relocate(first_group.id.clone(), at);
        let first_row = guard.memberships[first_idx].clone();
        let second_row = guard.memberships[second_idx].clone();

        // One row per (group, participant): a dropped row left in the
        // destination group is superseded by the moved seat
        let mut idx = 0;
        guard.memberships.retain(|m| {
            let current = idx;
            idx += 1;
            if current == first_idx || current == second_idx {
                return true;
            }
            let stale_first = m.group_id == second_group.id && &m.participant_id == first;
            let stale_second = m.group_id == first_group.id && &m.participant_id == second;
            !(stale_first || stale_second)
        });
        debug!(
            event = %event_id,
            first = %first,
            second = %second,
            "membership rows swapped"
        );

        Ok(SwapOutcome {
            first: first_row,
            second: second_row,
        })
    }

    async fn mark_dropped(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        at: DateTime<Utc>,
    ) -> CliqueResult<Membership> {
        let mut guard = self.write()?;
        let group = guard.group(group_id)?;
        if group.status.is_terminal() {
            return Err(CliqueError::GroupClosed {
                group_id: group_id.clone(),
                status: group.status,
            });
        }
        let idx = guard
            .row_index(group_id, participant_id)
            .filter(|idx| guard.memberships[*idx].is_active())
            .ok_or_else(|| CliqueError::NotAMember {
                participant_id: participant_id.clone(),
                scope: format!("group {}", group_id),
            })?;

        let row = &mut guard.memberships[idx];
        row.status = MembershipStatus::Dropped;
        row.readiness.updated_at = Some(at);
        Ok(row.clone())
    }

    async fn update_readiness(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        update: ReadinessUpdate,
        at: DateTime<Utc>,
    ) -> CliqueResult<Membership> {
        let mut guard = self.write()?;
        let group = guard.group(group_id)?;
        if !group.status.accepts_readiness_signals() {
            return Err(CliqueError::ReadinessNotOpen {
                group_id: group_id.clone(),
                status: group.status,
            });
        }
        let idx = guard
            .row_index(group_id, participant_id)
            .filter(|idx| guard.memberships[*idx].is_active())
            .ok_or_else(|| CliqueError::NotAMember {
                participant_id: participant_id.clone(),
                scope: format!("group {}", group_id),
            })?;

        let row = &mut guard.memberships[idx];
        row.readiness.apply(update, at);
        Ok(row.clone())
    }

    async fn list_memberships(&self, group_id: &GroupId) -> CliqueResult<Vec<Membership>> {
        let mut rows = self.read()?.group_rows(group_id);
        rows.sort_by_key(|m| m.joined_at);
        Ok(rows)
    }

    async fn active_membership(
        &self,
        event_id: &EventId,
        participant_id: &ParticipantId,
    ) -> CliqueResult<Option<Membership>> {
        Ok(self.read()?.holding(event_id, participant_id).cloned())
    }
}

#[async_trait]
impl MatchStore for InMemoryCliqueStorage {
    async fn insert_match_request(
        &self,
        request: NewMatchRequest,
        at: DateTime<Utc>,
    ) -> CliqueResult<MatchRequest> {
        let mut guard = self.write()?;
        if guard.match_requests.iter().any(|r| {
            r.origin_group_id == request.origin_group_id && r.requester == request.requester
        }) {
            return Err(CliqueError::DuplicateMatchRequest {
                participant_id: request.requester.clone(),
                group_id: request.origin_group_id.clone(),
            });
        }

        let seq = guard
            .match_requests
            .iter()
            .map(|r| r.submission_seq)
            .max()
            .unwrap_or(0)
            + 1;
        let stored = request.normalized().into_request(seq, at);
        guard.match_requests.push(stored.clone());
        Ok(stored)
    }

    async fn pending_match_requests(&self) -> CliqueResult<Vec<MatchRequest>> {
        let guard = self.read()?;
        let mut pending: Vec<MatchRequest> = guard
            .match_requests
            .iter()
            .filter(|r| r.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.submission_seq);
        Ok(pending)
    }

    async fn list_match_requests(
        &self,
        origin_group_id: &GroupId,
    ) -> CliqueResult<Vec<MatchRequest>> {
        let guard = self.read()?;
        let mut requests: Vec<MatchRequest> = guard
            .match_requests
            .iter()
            .filter(|r| &r.origin_group_id == origin_group_id)
            .cloned()
            .collect();
        requests.sort_by_key(|r| r.submission_seq);
        Ok(requests)
    }

    async fn commit_match_outcome(&self, commit: MatchCommit) -> CliqueResult<()> {
        let mut guard = self.write()?;

        let mut indices = Vec::with_capacity(commit.request_ids.len());
        for id in &commit.request_ids {
            let idx = guard
                .match_requests
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| CliqueError::InvalidInput(format!("unknown match request {}", id)))?;
            if guard.match_requests[idx].processed_at.is_some() {
                return Err(CliqueError::Conflict(format!(
                    "match request {} already processed",
                    id
                )));
            }
            indices.push(idx);
        }

        for idx in indices {
            guard.match_requests[idx].processed_at = Some(commit.processed_at);
        }
        if let Some(persistent_group) = commit.persistent_group {
            guard.persistent_groups.push(persistent_group);
        }
        Ok(())
    }

    async fn get_persistent_group(
        &self,
        id: &PersistentGroupId,
    ) -> CliqueResult<Option<PersistentGroup>> {
        Ok(self
            .read()?
            .persistent_groups
            .iter()
            .find(|g| &g.id == id)
            .cloned())
    }

    async fn list_persistent_groups(&self) -> CliqueResult<Vec<PersistentGroup>> {
        Ok(self.read()?.persistent_groups.clone())
    }
}

#[async_trait]
impl AuditStore for InMemoryCliqueStorage {
    async fn append_audit(&self, event: AuditEvent) -> CliqueResult<AuditRecord> {
        let mut guard = self.write()?;

        let previous_hash = guard.audit.last().map(|r| r.hash.clone());
        let sequence = guard.audit.len() as u64 + 1;
        let hash = compute_audit_hash(&event, previous_hash.as_deref(), sequence)?;

        let record = AuditRecord {
            sequence,
            event,
            previous_hash,
            hash,
        };
        guard.audit.push(record.clone());
        Ok(record)
    }

    async fn list_audit(&self, window: QueryWindow) -> CliqueResult<Vec<AuditRecord>> {
        let guard = self.read()?;
        let mut values = guard.audit.clone();
        values.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        Ok(apply_window(values, window))
    }
}

fn compute_audit_hash(
    event: &AuditEvent,
    previous_hash: Option<&str>,
    sequence: u64,
) -> CliqueResult<String> {
    let serializable = serde_json::json!({
        "previous_hash": previous_hash,
        "sequence": sequence,
        "event": event,
    });
    let serialized =
        serde_json::to_vec(&serializable).map_err(|e| CliqueError::Storage(e.to_string()))?;
    Ok(blake3::hash(&serialized).to_hex().to_string())
}

fn apply_window<T>(items: Vec<T>, window: QueryWindow) -> Vec<T> {
    let iter = items.into_iter().skip(window.offset);
    if window.limit == 0 {
        iter.collect()
    } else {
        iter.take(window.limit).collect()
    }
}
