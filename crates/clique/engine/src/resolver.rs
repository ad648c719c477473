//! Mutual-Match Resolver
//!
//! After a group completes, members may name the peers they want to keep in
//! touch with. A batch pass looks at every unprocessed request, groups them
//! by origin group and links two requesters when each selected the other.
//! Everyone on at least one such edge lands in one persistent group; the
//! earliest submitter leads it.
//!
//! Matching is not transitive: A–B and B–C put A, B and C together only
//! because each of them is on a direct edge, never because A "reaches" C.

use crate::context::EngineContext;
use crate::registry::GroupRegistry;
use chrono::Utc;
use clique_storage::MatchCommit;
use clique_types::{
    ActorId, AuditAction, AuditEvent, CliqueError, CliqueResult, EventId, GroupId, GroupStatus,
    MatchRequest, NewMatchRequest, Notification, ParticipantId, PersistentGroup, TemplateKind,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// An origin group whose batch could not be committed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchFailure {
    pub origin_group_id: GroupId,
    pub reason: String,
}

/// Outcome of one resolver pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRunReport {
    pub origin_groups_considered: usize,
    pub persistent_groups_created: Vec<PersistentGroup>,
    pub requests_processed: usize,
    /// Batches another pass committed first
    pub skipped_concurrent: usize,
    pub failures: Vec<MatchFailure>,
}

/// Pairs of requesters who selected each other, in submission order.
pub fn match_edges(requests: &[MatchRequest]) -> Vec<(ParticipantId, ParticipantId)> {
    let ordered = by_submission(requests);
    let mut edges = Vec::new();
    for (idx, a) in ordered.iter().enumerate() {
        for b in &ordered[idx + 1..] {
            if a.requester != b.requester && a.selects(&b.requester) && b.selects(&a.requester) {
                edges.push((a.requester.clone(), b.requester.clone()));
            }
        }
    }
    edges
}

/// Requesters on at least one mutual edge, earliest submitter first.
pub fn mutual_set(requests: &[MatchRequest]) -> Vec<ParticipantId> {
    let edges = match_edges(requests);
    let linked: HashSet<&ParticipantId> = edges.iter().flat_map(|(a, b)| [a, b]).collect();

    let mut members: Vec<ParticipantId> = Vec::new();
    for request in by_submission(requests) {
        if linked.contains(&request.requester) && !members.contains(&request.requester) {
            members.push(request.requester.clone());
        }
    }
    members
}

fn by_submission(requests: &[MatchRequest]) -> Vec<&MatchRequest> {
    let mut ordered: Vec<&MatchRequest> = requests.iter().collect();
    ordered.sort_by_key(|r| r.submission_seq);
    ordered
}

/// Turns reciprocal keep-in-touch picks into persistent groups.
#[derive(Clone)]
pub struct MutualMatchResolver {
    ctx: Arc<EngineContext>,
    registry: GroupRegistry,
}

impl MutualMatchResolver {
    pub fn new(ctx: Arc<EngineContext>, registry: GroupRegistry) -> Self {
        Self { ctx, registry }
    }

    /// Store a member's keep-in-touch selection for a completed group.
    pub async fn submit_request(
        &self,
        event_id: &EventId,
        origin_group_id: &GroupId,
        requester: &ParticipantId,
        selections: Vec<ParticipantId>,
        wants_to_keep: bool,
    ) -> CliqueResult<MatchRequest> {
        let group = self.registry.get(origin_group_id).await?;
        if &group.event_id != event_id {
            return Err(CliqueError::InvalidInput(format!(
                "group {} does not belong to event {}",
                origin_group_id, event_id
            )));
        }
        if group.status != GroupStatus::Completed {
            return Err(CliqueError::InvalidInput(format!(
                "group {} is {}; keep-in-touch requests open once it is completed",
                origin_group_id, group.status
            )));
        }

        let is_member = self
            .ctx
            .storage
            .list_memberships(origin_group_id)
            .await?
            .iter()
            .any(|m| m.is_active() && &m.participant_id == requester);
        if !is_member {
            return Err(CliqueError::NotAMember {
                participant_id: requester.clone(),
                scope: format!("group {}", origin_group_id),
            });
        }

        let mut request = NewMatchRequest::new(
            event_id.clone(),
            origin_group_id.clone(),
            requester.clone(),
            selections,
        );
        request.wants_to_keep = wants_to_keep && !request.selections.is_empty();

        let stored = self
            .ctx
            .storage
            .insert_match_request(request, Utc::now())
            .await?;
        debug!(
            group = %origin_group_id,
            requester = %requester,
            selections = stored.selections.len(),
            "Match request stored"
        );
        Ok(stored)
    }

    /// Resolve every pending request. Safe to re-run, also concurrently:
    /// a batch is committed at most once.
    pub async fn run(&self) -> CliqueResult<MatchRunReport> {
        let pending = self.ctx.storage.pending_match_requests().await?;

        let mut batches: BTreeMap<(EventId, GroupId), Vec<MatchRequest>> = BTreeMap::new();
        for request in pending {
            batches
                .entry((request.event_id.clone(), request.origin_group_id.clone()))
                .or_default()
                .push(request);
        }

        let mut report = MatchRunReport::default();
        for ((event_id, origin_group_id), requests) in batches {
            report.origin_groups_considered += 1;
            self.resolve_batch(&event_id, &origin_group_id, requests, &mut report)
                .await;
        }

        info!(
            origin_groups = report.origin_groups_considered,
            created = report.persistent_groups_created.len(),
            processed = report.requests_processed,
            skipped = report.skipped_concurrent,
            failed = report.failures.len(),
            "Match resolution finished"
        );
        Ok(report)
    }

    async fn resolve_batch(
        &self,
        event_id: &EventId,
        origin_group_id: &GroupId,
        requests: Vec<MatchRequest>,
        report: &mut MatchRunReport,
    ) {
        let members = if requests.len() >= 2 {
            mutual_set(&requests)
        } else {
            Vec::new()
        };

        let persistent_group = if members.len() >= 2 {
            let name = match self.registry.get(origin_group_id).await {
                Ok(group) => format!("{} crew", group.name),
                Err(_) => format!("Crew {}", origin_group_id.short()),
            };
            Some(PersistentGroup::new(
                name,
                event_id.clone(),
                origin_group_id.clone(),
                &members,
                Utc::now(),
            ))
        } else {
            debug!(
                group = %origin_group_id,
                requests = requests.len(),
                "No mutual match"
            );
            None
        };

        let commit = MatchCommit {
            request_ids: requests.iter().map(|r| r.id.clone()).collect(),
            persistent_group: persistent_group.clone(),
            processed_at: Utc::now(),
        };
        match self.ctx.storage.commit_match_outcome(commit).await {
            Ok(()) => {
                report.requests_processed += requests.len();
                if let Some(created) = persistent_group {
                    self.announce(&created).await;
                    report.persistent_groups_created.push(created);
                }
            }
            Err(CliqueError::Conflict(reason)) => {
                debug!(group = %origin_group_id, reason = %reason, "Batch already resolved");
                report.skipped_concurrent += 1;
            }
            Err(e) => {
                warn!(group = %origin_group_id, error = %e, "Match batch failed");
                report.failures.push(MatchFailure {
                    origin_group_id: origin_group_id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    async fn announce(&self, group: &PersistentGroup) {
        info!(
            persistent_group = %group.id,
            origin = %group.origin_group_id,
            members = group.members.len(),
            "Persistent group created"
        );
        self.ctx
            .record(
                AuditEvent::new(
                    ActorId::system(),
                    AuditAction::MatchCreated,
                    group.id.to_string(),
                )
                .with_after(json!({
                    "name": group.name,
                    "origin_group_id": group.origin_group_id,
                    "members": group.participant_ids(),
                    "leader": group.leader(),
                })),
            )
            .await;

        for participant_id in group.participant_ids() {
            self.ctx
                .dispatch(Notification::to_participant(
                    participant_id,
                    TemplateKind::MutualMatch,
                    json!({
                        "persistent_group_id": group.id,
                        "name": group.name,
                    }),
                ))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: &str) -> ParticipantId {
        ParticipantId::new(id)
    }

    fn request(seq: u64, requester: &str, picks: &[&str]) -> MatchRequest {
        NewMatchRequest::new(
            EventId::new("ev"),
            GroupId::new("g"),
            p(requester),
            picks.iter().map(|id| p(id)),
        )
        .into_request(seq, Utc::now())
    }

    #[test]
    fn test_reciprocal_picks_form_one_set() {
        let requests = vec![
            request(1, "a", &["b", "c"]),
            request(2, "b", &["a"]),
            request(3, "c", &["a", "b"]),
        ];
        assert_eq!(
            match_edges(&requests),
            vec![(p("a"), p("b")), (p("a"), p("c"))]
        );
        assert_eq!(mutual_set(&requests), vec![p("a"), p("b"), p("c")]);
    }

    #[test]
    fn test_one_sided_picks_do_not_link() {
        let requests = vec![request(1, "a", &["b"]), request(2, "b", &["c"])];
        assert!(match_edges(&requests).is_empty());
        assert!(mutual_set(&requests).is_empty());
    }

    #[test]
    fn test_earliest_submitter_leads() {
        let requests = vec![request(5, "a", &["b"]), request(2, "b", &["a"])];
        assert_eq!(mutual_set(&requests), vec![p("b"), p("a")]);
    }

    #[test]
    fn test_unlinked_requester_is_left_out() {
        let requests = vec![
            request(1, "a", &["b"]),
            request(2, "b", &["a"]),
            request(3, "c", &["a"]),
        ];
        assert_eq!(mutual_set(&requests), vec![p("a"), p("b")]);
    }
}
