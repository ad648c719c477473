//! Engine facade and builder

use crate::collaborators::{
    AuditLog, Notifier, Recommender, SequentialRecommender, StoreAuditLog, TracingNotifier,
};
use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::formation::FormationEngine;
use crate::ledger::MembershipLedger;
use crate::lifecycle::LifecycleStateMachine;
use crate::registry::GroupRegistry;
use crate::resolver::MutualMatchResolver;
use clique_storage::{CliqueStorage, InMemoryCliqueStorage};
use clique_types::{ActorId, CliqueResult, Group, GroupId, Membership, ParticipantId};
use std::sync::Arc;

/// All engine components wired to one storage backend.
#[derive(Clone)]
pub struct CliqueEngine {
    ctx: Arc<EngineContext>,
    registry: GroupRegistry,
    ledger: MembershipLedger,
    lifecycle: LifecycleStateMachine,
    formation: FormationEngine,
    resolver: MutualMatchResolver,
}

impl CliqueEngine {
    pub fn builder() -> CliqueEngineBuilder {
        CliqueEngineBuilder::new()
    }

    pub fn registry(&self) -> &GroupRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &MembershipLedger {
        &self.ledger
    }

    pub fn lifecycle(&self) -> &LifecycleStateMachine {
        &self.lifecycle
    }

    pub fn formation(&self) -> &FormationEngine {
        &self.formation
    }

    pub fn resolver(&self) -> &MutualMatchResolver {
        &self.resolver
    }

    pub fn storage(&self) -> &Arc<dyn CliqueStorage> {
        self.ctx.storage()
    }

    pub fn config(&self) -> &EngineConfig {
        self.ctx.config()
    }

    /// Drop a member, then re-run the warm-up advance check since the
    /// remaining members may now all be ready.
    pub async fn drop_member(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        actor: &ActorId,
    ) -> CliqueResult<(Membership, Group)> {
        let membership = self
            .ledger
            .mark_dropped(group_id, participant_id, actor)
            .await?;
        let group = self.lifecycle.refresh_readiness(group_id).await?;
        Ok((membership, group))
    }

    /// Unassign a member, then re-run the warm-up advance check.
    pub async fn remove_member(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        actor: &ActorId,
    ) -> CliqueResult<Option<Membership>> {
        let removed = self.ledger.unassign(group_id, participant_id, actor).await?;
        if removed.is_some() {
            self.lifecycle.refresh_readiness(group_id).await?;
        }
        Ok(removed)
    }
}

/// Builder for [`CliqueEngine`].
///
/// Unset collaborators fall back to an in-memory store, the tracing
/// notifier, the store-backed audit log and the sequential recommender.
#[derive(Default)]
pub struct CliqueEngineBuilder {
    storage: Option<Arc<dyn CliqueStorage>>,
    notifier: Option<Arc<dyn Notifier>>,
    audit: Option<Arc<dyn AuditLog>>,
    recommender: Option<Arc<dyn Recommender>>,
    config: Option<EngineConfig>,
}

impl CliqueEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_storage(mut self, storage: Arc<dyn CliqueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_audit_log(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn with_recommender(mut self, recommender: Arc<dyn Recommender>) -> Self {
        self.recommender = Some(recommender);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> CliqueResult<CliqueEngine> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let storage: Arc<dyn CliqueStorage> = self
            .storage
            .unwrap_or_else(|| Arc::new(InMemoryCliqueStorage::new()));
        let notifier = self
            .notifier
            .unwrap_or_else(|| Arc::new(TracingNotifier));
        let audit = self
            .audit
            .unwrap_or_else(|| Arc::new(StoreAuditLog::new(storage.clone())));
        let recommender = self
            .recommender
            .unwrap_or_else(|| Arc::new(SequentialRecommender));

        let ctx = Arc::new(EngineContext::new(storage, notifier, audit, config));
        let registry = GroupRegistry::new(ctx.clone());
        let ledger = MembershipLedger::new(ctx.clone());
        let lifecycle = LifecycleStateMachine::new(ctx.clone(), registry.clone());
        let formation = FormationEngine::new(
            ctx.clone(),
            registry.clone(),
            ledger.clone(),
            recommender,
        );
        let resolver = MutualMatchResolver::new(ctx.clone(), registry.clone());

        Ok(CliqueEngine {
            ctx,
            registry,
            ledger,
            lifecycle,
            formation,
            resolver,
        })
    }
}
