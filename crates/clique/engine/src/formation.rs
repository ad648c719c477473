//! Formation Engine: creating groups by hand or from recommender suggestions

use crate::collaborators::Recommender;
use crate::context::EngineContext;
use crate::ledger::MembershipLedger;
use crate::registry::GroupRegistry;
use chrono::Utc;
use clique_storage::SwapOutcome;
use clique_types::{
    ActorId, AuditAction, AuditEvent, CliqueError, CliqueResult, EventId, Group, GroupId,
    MemberRole, Membership, NewGroup, ParticipantId, SuggestedGroup,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A suggested cluster that could not be turned into a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterFailure {
    /// Position in the recommender's answer
    pub cluster_index: usize,
    pub reason: String,
}

/// Outcome of an auto-formation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormationReport {
    pub created: Vec<GroupId>,
    pub failures: Vec<ClusterFailure>,
}

/// Builds groups for an event.
#[derive(Clone)]
pub struct FormationEngine {
    ctx: Arc<EngineContext>,
    registry: GroupRegistry,
    ledger: MembershipLedger,
    recommender: Arc<dyn Recommender>,
}

impl FormationEngine {
    pub fn new(
        ctx: Arc<EngineContext>,
        registry: GroupRegistry,
        ledger: MembershipLedger,
        recommender: Arc<dyn Recommender>,
    ) -> Self {
        Self {
            ctx,
            registry,
            ledger,
            recommender,
        }
    }

    /// Create an empty `draft` group. Capacity falls back to the configured default.
    pub async fn create_group(
        &self,
        event_id: &EventId,
        target_capacity: Option<usize>,
        actor: &ActorId,
    ) -> CliqueResult<Group> {
        let capacity = target_capacity.unwrap_or(self.ctx.config.default_target_capacity);
        self.registry
            .create(NewGroup::draft(event_id.clone(), capacity), actor)
            .await
    }

    /// Remove a `draft` group that never had members.
    pub async fn discard_group(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        self.registry.discard(group_id, actor).await
    }

    /// Seat a participant in a forming (`draft`/`confirmed`), unlocked group.
    pub async fn manual_assign(
        &self,
        group_id: &GroupId,
        participant_id: &ParticipantId,
        actor: &ActorId,
    ) -> CliqueResult<Membership> {
        self.ledger
            .assign_with(group_id, participant_id, MemberRole::Member, true, actor)
            .await
    }

    pub async fn swap(
        &self,
        event_id: &EventId,
        first: &ParticipantId,
        second: &ParticipantId,
        actor: &ActorId,
    ) -> CliqueResult<SwapOutcome> {
        self.ledger.swap(event_id, first, second, actor).await
    }

    pub async fn lock(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        self.registry.lock(group_id, actor).await
    }

    pub async fn unlock(&self, group_id: &GroupId, actor: &ActorId) -> CliqueResult<Group> {
        self.registry.unlock(group_id, actor).await
    }

    /// Ask the recommender to cluster the unassigned pool and create one
    /// `confirmed` group per cluster.
    ///
    /// Each cluster is created together with its memberships or not at all.
    /// A rejected cluster is reported and skipped; earlier clusters stay.
    pub async fn auto_generate(
        &self,
        event_id: &EventId,
        target_size: usize,
        actor: &ActorId,
    ) -> CliqueResult<FormationReport> {
        if target_size == 0 {
            return Err(CliqueError::InvalidInput(
                "target size must be at least 1".into(),
            ));
        }

        let pool = self.ledger.unassigned_participants(event_id).await?;
        let mut report = FormationReport::default();
        if pool.is_empty() {
            info!(event = %event_id, "No unassigned participants, nothing to form");
            return Ok(report);
        }

        let suggestions = self.suggest(event_id, &pool, target_size).await?;
        info!(
            event = %event_id,
            pool = pool.len(),
            clusters = suggestions.len(),
            "Recommender returned clusters"
        );

        let eligible: HashSet<&ParticipantId> = pool.iter().collect();
        for (cluster_index, suggestion) in suggestions.into_iter().enumerate() {
            match self
                .form_cluster(event_id, &eligible, suggestion, target_size, actor)
                .await
            {
                Ok(group) => report.created.push(group.id),
                Err(e) => {
                    warn!(
                        event = %event_id,
                        cluster = cluster_index,
                        error = %e,
                        "Cluster skipped"
                    );
                    report.failures.push(ClusterFailure {
                        cluster_index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            event = %event_id,
            created = report.created.len(),
            failed = report.failures.len(),
            "Auto-formation finished"
        );
        Ok(report)
    }

    async fn suggest(
        &self,
        event_id: &EventId,
        pool: &[ParticipantId],
        target_size: usize,
    ) -> CliqueResult<Vec<SuggestedGroup>> {
        let timeout = self.ctx.config.recommender_timeout();
        match tokio::time::timeout(
            timeout,
            self.recommender.suggest_groups(event_id, pool, target_size),
        )
        .await
        {
            Ok(Ok(suggestions)) => Ok(suggestions),
            Ok(Err(e)) => Err(CliqueError::RecommenderUnavailable(e.to_string())),
            Err(_) => Err(CliqueError::RecommenderUnavailable(format!(
                "no answer within {}s",
                timeout.as_secs()
            ))),
        }
    }

    async fn form_cluster(
        &self,
        event_id: &EventId,
        eligible: &HashSet<&ParticipantId>,
        suggestion: SuggestedGroup,
        target_size: usize,
        actor: &ActorId,
    ) -> CliqueResult<Group> {
        if suggestion.member_ids.is_empty() {
            return Err(CliqueError::InvalidInput("cluster has no members".into()));
        }
        if suggestion.member_ids.len() > target_size {
            return Err(CliqueError::InvalidInput(format!(
                "cluster of {} exceeds target size {}",
                suggestion.member_ids.len(),
                target_size
            )));
        }
        if let Some(outsider) = suggestion
            .member_ids
            .iter()
            .find(|p| !eligible.contains(p))
        {
            return Err(CliqueError::InvalidInput(format!(
                "participant {} is not in the unassigned pool",
                outsider
            )));
        }

        let provenance = suggestion.provenance();
        let (group, memberships) = self
            .ctx
            .storage
            .create_group_with_members(
                NewGroup::recommended(event_id.clone(), target_size, provenance),
                &suggestion.member_ids,
                Utc::now(),
            )
            .await?;

        debug!(
            group = %group.id,
            name = %group.name,
            members = memberships.len(),
            "Cluster persisted"
        );
        self.ctx
            .record(
                AuditEvent::new(actor.clone(), AuditAction::GroupCreated, group.id.to_string())
                    .with_after(json!({
                        "name": group.name,
                        "status": group.status,
                        "target_capacity": group.target_capacity,
                        "formation": group.formation,
                        "members": suggestion.member_ids,
                    })),
            )
            .await;
        Ok(group)
    }
}
