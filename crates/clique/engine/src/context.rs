//! Shared handles for the engine components

use crate::collaborators::{AuditLog, Notifier};
use crate::config::EngineConfig;
use clique_storage::CliqueStorage;
use clique_types::{AuditEvent, Notification};
use std::sync::Arc;
use tracing::warn;

/// Storage, collaborators and configuration shared by every component.
pub struct EngineContext {
    pub(crate) storage: Arc<dyn CliqueStorage>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) audit: Arc<dyn AuditLog>,
    pub(crate) config: EngineConfig,
}

impl EngineContext {
    pub fn new(
        storage: Arc<dyn CliqueStorage>,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditLog>,
        config: EngineConfig,
    ) -> Self {
        Self {
            storage,
            notifier,
            audit,
            config,
        }
    }

    pub fn storage(&self) -> &Arc<dyn CliqueStorage> {
        &self.storage
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Append to the audit log. Failures are logged, never returned.
    pub(crate) async fn record(&self, event: AuditEvent) {
        let action = event.action;
        let target = event.target.clone();
        if let Err(e) = self.audit.record(event).await {
            warn!(
                action = action.as_str(),
                target = %target,
                error = %e,
                "Audit record failed"
            );
        }
    }

    /// Hand a notification to the notifier. Failures are logged, never returned.
    pub(crate) async fn dispatch(&self, notification: Notification) {
        let template = notification.template;
        if let Err(e) = self.notifier.notify(notification).await {
            warn!(template = ?template, error = %e, "Notification dispatch failed");
        }
    }
}
