//! Membership ledger: who sits in which group of an event
//!
//! Every mutation here is one guarded storage call: capacity, exclusivity
//! and lock checks run in the same write step that applies the change.

use crate::context::EngineContext;
use chrono::Utc;
use clique_storage::{AssignMember, SwapOutcome};
use clique_types::{
    ActorId, AuditAction, AuditEvent, CliqueError, CliqueResult, EventId, GroupId, MemberRole,
    Membership, ParticipantId,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Assignment, removal and swap of memberships.
#[derive(Clone)]
pub struct MembershipLedger {
    ctx: Arc<EngineContext>,
}

impl MembershipLedger {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Seat a participant as a plain member.
    pub async fn assign(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        actor: &ActorId,
    ) -> CliqueResult<Membership> {
        self.assign_with(group_id, participant_id, MemberRole::Member, false, actor)
            .await
    }

    /// Seat a participant with a functional role.
    pub async fn assign_with_role(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        role: MemberRole,
        actor: &ActorId,
    ) -> CliqueResult<Membership> {
        self.assign_with(group_id, participant_id, role, false, actor)
            .await
    }

    pub(crate) async fn assign_with(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        role: MemberRole,
        require_forming: bool,
        actor: &ActorId,
    ) -> CliqueResult<Membership> {
        let assignment = self
            .ctx
            .storage
            .assign_member(AssignMember {
                group_id: group_id.clone(),
                participant_id: participant_id.clone(),
                role,
                require_forming,
                at: Utc::now(),
            })
            .await?;

        if !assignment.created {
            debug!(
                group = %group_id,
                participant = %participant_id,
                "Participant already seated"
            );
            return Ok(assignment.membership);
        }

        info!(
            group = %group_id,
            participant = %participant_id,
            actor = %actor,
            "Member assigned"
        );
        self.ctx
            .record(
                AuditEvent::new(
                    actor.clone(),
                    AuditAction::MemberAssigned,
                    participant_id.to_string(),
                )
                .with_after(json!({
                    "group_id": group_id,
                    "role": assignment.membership.role,
                })),
            )
            .await;
        Ok(assignment.membership)
    }

    /// Remove a membership row. Removing an absent membership is a no-op.
    pub async fn unassign(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        actor: &ActorId,
    ) -> CliqueResult<Option<Membership>> {
        let removed = self
            .ctx
            .storage
            .unassign_member(group_id, participant_id)
            .await?;

        if let Some(membership) = &removed {
            info!(
                group = %group_id,
                participant = %participant_id,
                actor = %actor,
                "Member unassigned"
            );
            self.ctx
                .record(
                    AuditEvent::new(
                        actor.clone(),
                        AuditAction::MemberUnassigned,
                        participant_id.to_string(),
                    )
                    .with_before(json!({
                        "group_id": group_id,
                        "status": membership.status,
                    })),
                )
                .await;
        }
        Ok(removed)
    }

    /// Exchange the groups of two participants of one event.
    ///
    /// Both rows move or neither does.
    pub async fn swap(
        &self,
        event_id: &EventId,
        first: &ParticipantId,
        second: &ParticipantId,
        actor: &ActorId,
    ) -> CliqueResult<SwapOutcome> {
        let outcome = self
            .ctx
            .storage
            .swap_members(event_id, first, second, Utc::now())
            .await?;

        info!(
            event = %event_id,
            first = %first,
            second = %second,
            actor = %actor,
            "Members swapped"
        );
        self.ctx
            .record(
                AuditEvent::new(
                    actor.clone(),
                    AuditAction::MembersSwapped,
                    format!("{} <-> {}", first, second),
                )
                .with_before(json!({
                    first.as_str(): outcome.second.group_id,
                    second.as_str(): outcome.first.group_id,
                }))
                .with_after(json!({
                    first.as_str(): outcome.first.group_id,
                    second.as_str(): outcome.second.group_id,
                })),
            )
            .await;
        Ok(outcome)
    }

    /// Flag a membership as dropped. The row stays on record.
    pub async fn mark_dropped(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        actor: &ActorId,
    ) -> CliqueResult<Membership> {
        let membership = self
            .ctx
            .storage
            .mark_dropped(group_id, participant_id, Utc::now())
            .await?;

        info!(
            group = %group_id,
            participant = %participant_id,
            actor = %actor,
            "Member dropped"
        );
        self.ctx
            .record(
                AuditEvent::new(
                    actor.clone(),
                    AuditAction::MemberDropped,
                    participant_id.to_string(),
                )
                .with_before(json!({ "group_id": group_id, "status": "active" }))
                .with_after(json!({ "group_id": group_id, "status": membership.status })),
            )
            .await;
        Ok(membership)
    }

    /// Active members ordered by join time.
    pub async fn members_of(&self, group_id: &GroupId) -> CliqueResult<Vec<Membership>> {
        if self.ctx.storage.get_group(group_id).await?.is_none() {
            return Err(CliqueError::GroupNotFound(group_id.clone()));
        }
        let rows = self.ctx.storage.list_memberships(group_id).await?;
        Ok(rows.into_iter().filter(Membership::is_active).collect())
    }

    /// The participant's active membership in an open group of the event.
    pub async fn membership_of(
        &self,
        event_id: &EventId,
        participant_id: &ParticipantId,
    ) -> CliqueResult<Option<Membership>> {
        self.ctx
            .storage
            .active_membership(event_id, participant_id)
            .await
    }

    /// Registered participants without an active seat, in roster order.
    pub async fn unassigned_participants(
        &self,
        event_id: &EventId,
    ) -> CliqueResult<Vec<ParticipantId>> {
        let event = self
            .ctx
            .storage
            .get_event(event_id)
            .await?
            .ok_or_else(|| CliqueError::EventNotFound(event_id.clone()))?;

        let mut pool = Vec::new();
        for participant_id in event.participants {
            if self
                .ctx
                .storage
                .active_membership(event_id, &participant_id)
                .await?
                .is_none()
            {
                pool.push(participant_id);
            }
        }
        Ok(pool)
    }
}
