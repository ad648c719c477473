//! Collaborator interfaces the engine calls out to.
//!
//! The recommender, notifier and audit log are injected as trait objects.
//! Notifier and audit failures are logged by the engine and never fail the
//! operation that produced them. A recommender failure aborts the formation
//! pass that asked for suggestions.

use async_trait::async_trait;
use clique_storage::CliqueStorage;
use clique_types::{
    AuditEvent, CliqueError, EventId, Notification, NotificationTarget, ParticipantId,
    SuggestedGroup,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors raised by collaborator implementations
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("collaborator rejected the request: {0}")]
    Rejected(String),

    #[error(transparent)]
    Storage(#[from] CliqueError),
}

/// Suggests compatible clusters from an unassigned pool.
#[async_trait]
pub trait Recommender: Send + Sync {
    async fn suggest_groups(
        &self,
        event_id: &EventId,
        unassigned: &[ParticipantId],
        target_size: usize,
    ) -> Result<Vec<SuggestedGroup>, CollaboratorError>;
}

/// Best-effort delivery of templated notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), CollaboratorError>;
}

/// Append-only record of administrative and automatic changes.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<(), CollaboratorError>;
}

/// Chunks the pool in roster order. No compatibility model behind it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialRecommender;

#[async_trait]
impl Recommender for SequentialRecommender {
    async fn suggest_groups(
        &self,
        _event_id: &EventId,
        unassigned: &[ParticipantId],
        target_size: usize,
    ) -> Result<Vec<SuggestedGroup>, CollaboratorError> {
        if target_size == 0 {
            return Err(CollaboratorError::Rejected(
                "target size must be at least 1".into(),
            ));
        }
        Ok(unassigned
            .chunks(target_size)
            .map(|chunk| SuggestedGroup {
                member_ids: chunk.to_vec(),
                compatibility_score: 0.0,
                formation_reason: "sequential roster order".to_string(),
            })
            .collect())
    }
}

/// Writes each notification to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), CollaboratorError> {
        match &notification.target {
            NotificationTarget::Group(group_id) => info!(
                group = %group_id,
                template = ?notification.template,
                payload = %notification.payload,
                "Notification to group"
            ),
            NotificationTarget::Participants(participants) => info!(
                participants = ?participants,
                template = ?notification.template,
                payload = %notification.payload,
                "Notification to participants"
            ),
        }
        Ok(())
    }
}

/// Drops every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _notification: Notification) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

/// Appends audit events to the storage audit chain.
#[derive(Clone)]
pub struct StoreAuditLog {
    storage: Arc<dyn CliqueStorage>,
}

impl StoreAuditLog {
    pub fn new(storage: Arc<dyn CliqueStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl AuditLog for StoreAuditLog {
    async fn record(&self, event: AuditEvent) -> Result<(), CollaboratorError> {
        self.storage.append_audit(event).await?;
        Ok(())
    }
}
