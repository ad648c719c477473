//! Group Registry: group records, lock state and event lookups

use crate::context::EngineContext;
use chrono::Utc;
use clique_types::{
    ActorId, AuditAction, AuditEvent, CliqueError, CliqueResult, EventId, EventRecord, Group,
    GroupId, LockState, NewGroup,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

/// Read and write access to group records.
#[derive(Clone)]
pub struct GroupRegistry {
    ctx: Arc<EngineContext>,
}

impl GroupRegistry {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Register or refresh an event record (title and roster).
    pub async fn register_event(&self, event: EventRecord) -> CliqueResult<()> {
        info!(
            event = %event.id,
            participants = event.participants.len(),
            "Event registered"
        );
        self.ctx.storage.upsert_event(event).await
    }

    pub async fn event(&self, event_id: &EventId) -> CliqueResult<EventRecord> {
        self.ctx
            .storage
            .get_event(event_id)
            .await?
            .ok_or_else(|| CliqueError::EventNotFound(event_id.clone()))
    }

    pub async fn get(&self, group_id: &GroupId) -> CliqueResult<Group> {
        self.ctx
            .storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| CliqueError::GroupNotFound(group_id.clone()))
    }

    /// Groups of an event in creation order.
    pub async fn list(&self, event_id: &EventId) -> CliqueResult<Vec<Group>> {
        self.ctx.storage.list_groups(event_id).await
    }

    /// Create a group; the store assigns its sequence number and name.
    pub async fn create(&self, new_group: NewGroup, actor: &ActorId) -> CliqueResult<Group> {
        if new_group.target_capacity == 0 {
            return Err(CliqueError::InvalidInput(
                "target capacity must be at least 1".into(),
            ));
        }
        let group = self.ctx.storage.create_group(new_group, Utc::now()).await?;

        info!(
            group = %group.id,
            event = %group.event_id,
            name = %group.name,
            status = %group.status,
            "Group created"
        );
        self.ctx
            .record(
                AuditEvent::new(actor.clone(), AuditAction::GroupCreated, group.id.to_string())
                    .with_after(json!({
                        "name": group.name,
                        "status": group.status,
                        "target_capacity": group.target_capacity,
                    })),
            )
            .await;
        Ok(group)
    }

    /// Set the lock flag. Locking a locked group changes nothing.
    pub async fn lock(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        let group = self.get(group_id).await?;
        if group.is_locked() {
            debug!(group = %group_id, "Group already locked");
            return Ok(group);
        }

        let change = self
            .ctx
            .storage
            .set_lock(group_id, Some(LockState::new(actor.clone())), Utc::now())
            .await?;

        info!(group = %group_id, actor = %actor, "Group locked");
        self.ctx
            .record(
                AuditEvent::new(actor.clone(), AuditAction::GroupLocked, group_id.to_string())
                    .with_before(json!({ "lock": change.previous }))
                    .with_after(json!({ "lock": change.group.lock })),
            )
            .await;
        Ok(change.group)
    }

    /// Clear the lock flag. Unlocking an unlocked group changes nothing.
    pub async fn unlock(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        let group = self.get(group_id).await?;
        if !group.is_locked() {
            debug!(group = %group_id, "Group already unlocked");
            return Ok(group);
        }

        let change = self.ctx.storage.set_lock(group_id, None, Utc::now()).await?;

        info!(group = %group_id, actor = %actor, "Group unlocked");
        self.ctx
            .record(
                AuditEvent::new(
                    actor.clone(),
                    AuditAction::GroupUnlocked,
                    group_id.to_string(),
                )
                .with_before(json!({ "lock": change.previous }))
                .with_after(json!({ "lock": null })),
            )
            .await;
        Ok(change.group)
    }

    /// Remove an empty draft group.
    pub async fn discard(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        let group = self.ctx.storage.discard_group(group_id).await?;

        info!(group = %group_id, name = %group.name, "Group discarded");
        self.ctx
            .record(
                AuditEvent::new(
                    actor.clone(),
                    AuditAction::GroupDiscarded,
                    group_id.to_string(),
                )
                .with_before(json!({ "name": group.name, "status": group.status })),
            )
            .await;
        Ok(group)
    }
}
