//! Lifecycle State Machine
//!
//! `draft → confirmed → warming_up → ready_for_review → approved → active →
//! completed`, plus the `ready_for_review → warming_up` hold-back. The table
//! lives on [`GroupStatus`]; this module applies it with compare-and-set
//! writes so a racing transition fails instead of overwriting.

use crate::context::EngineContext;
use crate::registry::GroupRegistry;
use chrono::Utc;
use clique_storage::StatusChange;
use clique_types::{
    ActorId, ApprovalChange, ApprovalRecord, AuditAction, AuditEvent, CliqueError, CliqueResult,
    Group, GroupId, GroupStatus, Membership, Notification, ParticipantId, ReadinessUpdate,
    TemplateKind, TransitionGuard, WarmUpProgress, WarmUpProgressCalculator,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Result of a readiness signal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessReceipt {
    pub membership: Membership,
    pub progress: WarmUpProgress,
    /// Group status after the automatic advance check
    pub status: GroupStatus,
}

/// Validates and applies group status transitions.
#[derive(Clone)]
pub struct LifecycleStateMachine {
    ctx: Arc<EngineContext>,
    registry: GroupRegistry,
}

impl LifecycleStateMachine {
    pub fn new(ctx: Arc<EngineContext>, registry: GroupRegistry) -> Self {
        Self { ctx, registry }
    }

    fn calculator(&self) -> WarmUpProgressCalculator {
        WarmUpProgressCalculator::new(self.ctx.config.required_readiness_percent)
    }

    /// `draft → confirmed`
    pub async fn confirm(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        self.transition(
            group_id,
            GroupStatus::Draft,
            GroupStatus::Confirmed,
            actor,
            ApprovalChange::Keep,
        )
        .await
    }

    /// `confirmed → warming_up`; the group must be locked and have members.
    pub async fn begin_warm_up(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        let group = self
            .transition(
                group_id,
                GroupStatus::Confirmed,
                GroupStatus::WarmingUp,
                actor,
                ApprovalChange::Keep,
            )
            .await?;

        self.ctx
            .dispatch(Notification::to_group(
                group.id.clone(),
                TemplateKind::WarmUpStarted,
                json!({ "group_name": group.name }),
            ))
            .await;
        Ok(group)
    }

    /// Record a participant's warm-up response.
    pub async fn submit_response(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        response: impl Into<String>,
    ) -> CliqueResult<ReadinessReceipt> {
        let response = response.into();
        if response.trim().is_empty() {
            return Err(CliqueError::InvalidInput(
                "warm-up response must not be blank".into(),
            ));
        }
        self.signal(group_id, participant_id, ReadinessUpdate::Response(response))
            .await
    }

    /// Record a participant's explicit readiness confirmation.
    pub async fn confirm_readiness(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
    ) -> CliqueResult<ReadinessReceipt> {
        self.signal(group_id, participant_id, ReadinessUpdate::Confirm)
            .await
    }

    async fn signal(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        update: ReadinessUpdate,
    ) -> CliqueResult<ReadinessReceipt> {
        let membership = self
            .ctx
            .storage
            .update_readiness(group_id, participant_id, update, Utc::now())
            .await?;
        debug!(
            group = %group_id,
            participant = %participant_id,
            ready = membership.readiness.is_ready(),
            "Readiness signal recorded"
        );

        let group = self.refresh_readiness(group_id).await?;
        let progress = self.progress(group_id).await?;
        Ok(ReadinessReceipt {
            membership,
            progress,
            status: group.status,
        })
    }

    /// Advance `warming_up → ready_for_review` when readiness is complete.
    ///
    /// Safe to call any number of times; losing a race to another writer
    /// leaves the group as that writer left it.
    pub async fn refresh_readiness(&self, group_id: &GroupId) -> CliqueResult<Group> {
        let group = self.registry.get(group_id).await?;
        if group.status != GroupStatus::WarmingUp {
            return Ok(group);
        }
        if !self.progress(group_id).await?.is_complete {
            return Ok(group);
        }

        match self
            .transition(
                group_id,
                GroupStatus::WarmingUp,
                GroupStatus::ReadyForReview,
                &ActorId::system(),
                ApprovalChange::Keep,
            )
            .await
        {
            Ok(group) => Ok(group),
            Err(CliqueError::InvalidTransition { reason, .. }) => {
                debug!(group = %group_id, reason = %reason, "Automatic advance skipped");
                self.registry.get(group_id).await
            }
            Err(e) => Err(e),
        }
    }

    /// `ready_for_review → approved`. Readiness is checked again as part of
    /// the same write.
    pub async fn approve(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        let group = self
            .transition(
                group_id,
                GroupStatus::ReadyForReview,
                GroupStatus::Approved,
                actor,
                ApprovalChange::Set(ApprovalRecord {
                    approved_by: actor.clone(),
                    approved_at: Utc::now(),
                }),
            )
            .await?;

        self.ctx
            .dispatch(Notification::to_group(
                group.id.clone(),
                TemplateKind::InstructionsUnlocked,
                json!({ "group_name": group.name }),
            ))
            .await;
        Ok(group)
    }

    /// `ready_for_review → warming_up`, clearing any approval record.
    pub async fn hold_back(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        self.transition(
            group_id,
            GroupStatus::ReadyForReview,
            GroupStatus::WarmingUp,
            actor,
            ApprovalChange::Clear,
        )
        .await
    }

    /// `approved → active`
    pub async fn activate(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        self.transition(
            group_id,
            GroupStatus::Approved,
            GroupStatus::Active,
            actor,
            ApprovalChange::Keep,
        )
        .await
    }

    /// `approved | active → completed`. Completing a completed group is a no-op.
    pub async fn complete(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        let group = self.registry.get(group_id).await?;
        if group.status == GroupStatus::Completed {
            debug!(group = %group_id, "Group already completed");
            return Ok(group);
        }

        let group = match self
            .transition(
                group_id,
                group.status,
                GroupStatus::Completed,
                actor,
                ApprovalChange::Keep,
            )
            .await
        {
            Ok(group) => group,
            Err(err @ CliqueError::InvalidTransition { .. }) => {
                // A concurrent completion won the compare-and-set
                let current = self.registry.get(group_id).await?;
                if current.status == GroupStatus::Completed {
                    debug!(group = %group_id, "Group completed concurrently");
                    return Ok(current);
                }
                return Err(err);
            }
            Err(e) => return Err(e),
        };

        self.ctx
            .dispatch(Notification::to_group(
                group.id.clone(),
                TemplateKind::GroupCompleted,
                json!({ "group_name": group.name }),
            ))
            .await;
        Ok(group)
    }

    /// Warm-up readiness of the group's active members.
    pub async fn progress(&self, group_id: &GroupId) -> CliqueResult<WarmUpProgress> {
        let memberships = self.ctx.storage.list_memberships(group_id).await?;
        Ok(self.calculator().compute(&memberships))
    }

    async fn transition(
        &self,
        group_id: &GroupId,
        expected_from: GroupStatus,
        to: GroupStatus,
        actor: &ActorId,
        approval: ApprovalChange,
    ) -> CliqueResult<Group> {
        let group = self.registry.get(group_id).await?;
        if group.status != expected_from {
            return Err(CliqueError::invalid_transition(
                group_id,
                group.status,
                to,
                format!("group must be {}", expected_from),
            ));
        }
        if !expected_from.can_transition_to(to) {
            return Err(CliqueError::invalid_transition(
                group_id,
                expected_from,
                to,
                "not a lifecycle transition",
            ));
        }

        let guard = TransitionGuard::for_transition(
            expected_from,
            to,
            self.ctx.config.required_readiness_percent,
        );
        let updated = self
            .ctx
            .storage
            .transition_status(StatusChange {
                group_id: group_id.clone(),
                expected_from,
                to,
                guard,
                approval,
                at: Utc::now(),
            })
            .await?;

        info!(
            group = %group_id,
            from = %expected_from,
            to = %to,
            actor = %actor,
            "Group status changed"
        );
        self.ctx
            .record(
                AuditEvent::new(actor.clone(), AuditAction::StatusChanged, group_id.to_string())
                    .with_before(json!({
                        "status": expected_from,
                        "approval": group.approval,
                    }))
                    .with_after(json!({
                        "status": updated.status,
                        "approval": updated.approval,
                    })),
            )
            .await;
        Ok(updated)
    }
}
