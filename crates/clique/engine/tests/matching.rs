//! Keep-in-touch requests and the mutual-match batch pass.

mod common;

use clique_engine::CliqueEngine;
use clique_storage::QueryWindow;
use clique_types::{AuditAction, CliqueError, NotificationTarget, TemplateKind};
use common::*;
use std::sync::Arc;

async fn submit(engine: &CliqueEngine, group: &clique_types::Group, who: &str, picks: &[&str]) {
    engine
        .resolver()
        .submit_request(
            &group.event_id,
            &group.id,
            &p(who),
            picks.iter().map(|id| p(id)).collect(),
            true,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn reciprocal_picks_create_one_persistent_group() {
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = engine_with_notifier(notifier.clone());
    let event = seed_event(&engine, "hike", "Sunday Hike", &[]).await;
    let group = completed_group(&engine, &event, &["a", "b", "c"]).await;

    submit(&engine, &group, "a", &["b", "c"]).await;
    submit(&engine, &group, "b", &["a"]).await;
    submit(&engine, &group, "c", &["a", "b"]).await;

    let report = engine.resolver().run().await.unwrap();
    assert_eq!(report.origin_groups_considered, 1);
    assert_eq!(report.requests_processed, 3);
    assert_eq!(report.persistent_groups_created.len(), 1);

    let created = &report.persistent_groups_created[0];
    assert_eq!(created.participant_ids(), vec![p("a"), p("b"), p("c")]);
    assert_eq!(created.leader(), Some(&p("a")));
    assert_eq!(created.origin_group_id, group.id);
    assert_eq!(created.name, "Sunday Hike 1 crew");

    let match_notices: Vec<_> = notifier
        .sent()
        .into_iter()
        .filter(|n| n.template == TemplateKind::MutualMatch)
        .collect();
    assert_eq!(match_notices.len(), 3);
    assert_eq!(
        match_notices[0].target,
        NotificationTarget::Participants(vec![p("a")])
    );

    let audit = engine
        .storage()
        .list_audit(QueryWindow::latest(1))
        .await
        .unwrap();
    assert_eq!(audit[0].event.action, AuditAction::MatchCreated);
}

#[tokio::test]
async fn rerunning_the_resolver_creates_nothing_new() {
    let engine = engine();
    let event = seed_event(&engine, "hike", "Sunday Hike", &[]).await;
    let group = completed_group(&engine, &event, &["a", "b"]).await;
    submit(&engine, &group, "a", &["b"]).await;
    submit(&engine, &group, "b", &["a"]).await;

    let first = engine.resolver().run().await.unwrap();
    let second = engine.resolver().run().await.unwrap();
    assert_eq!(first.persistent_groups_created.len(), 1);
    assert_eq!(second.origin_groups_considered, 0);
    assert!(second.persistent_groups_created.is_empty());
    assert_eq!(engine.storage().list_persistent_groups().await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_runs_commit_each_batch_once() {
    let engine = engine();
    let event = seed_event(&engine, "hike", "Sunday Hike", &[]).await;
    let group = completed_group(&engine, &event, &["a", "b"]).await;
    submit(&engine, &group, "a", &["b"]).await;
    submit(&engine, &group, "b", &["a"]).await;

    let (left, right) = tokio::join!(engine.resolver().run(), engine.resolver().run());
    let left = left.unwrap();
    let right = right.unwrap();
    assert_eq!(
        left.persistent_groups_created.len() + right.persistent_groups_created.len(),
        1
    );
    assert_eq!(engine.storage().list_persistent_groups().await.unwrap().len(), 1);
}

#[tokio::test]
async fn lone_requester_is_processed_without_a_group() {
    let engine = engine();
    let event = seed_event(&engine, "hike", "Sunday Hike", &[]).await;
    let group = completed_group(&engine, &event, &["a", "b"]).await;
    submit(&engine, &group, "a", &["b"]).await;

    let report = engine.resolver().run().await.unwrap();
    assert_eq!(report.requests_processed, 1);
    assert!(report.persistent_groups_created.is_empty());
    assert!(engine
        .storage()
        .pending_match_requests()
        .await
        .unwrap()
        .is_empty());

    // The late reciprocal pick is judged on its own
    submit(&engine, &group, "b", &["a"]).await;
    let report = engine.resolver().run().await.unwrap();
    assert!(report.persistent_groups_created.is_empty());
}

#[tokio::test]
async fn matching_stays_within_one_origin_group() {
    let engine = engine();
    let event = seed_event(&engine, "hike", "Sunday Hike", &[]).await;
    let first = completed_group(&engine, &event, &["a", "b"]).await;
    let second = completed_group(&engine, &event, &["c", "d"]).await;

    submit(&engine, &first, "a", &["c"]).await;
    submit(&engine, &first, "b", &["a"]).await;
    submit(&engine, &second, "c", &["a"]).await;
    submit(&engine, &second, "d", &["c"]).await;

    let report = engine.resolver().run().await.unwrap();
    assert_eq!(report.origin_groups_considered, 2);
    assert_eq!(report.requests_processed, 4);
    assert!(report.persistent_groups_created.is_empty());
}

#[tokio::test]
async fn opted_out_requests_are_not_pending() {
    let engine = engine();
    let event = seed_event(&engine, "hike", "Sunday Hike", &[]).await;
    let group = completed_group(&engine, &event, &["a", "b"]).await;

    let request = engine
        .resolver()
        .submit_request(&event, &group.id, &p("a"), vec![p("b")], false)
        .await
        .unwrap();
    assert!(!request.wants_to_keep);
    assert!(engine
        .storage()
        .pending_match_requests()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn requests_need_a_completed_group_and_membership() {
    let engine = engine();
    let event = seed_event(&engine, "hike", "Sunday Hike", &[]).await;
    let warming = warming_group(&engine, &event, &["a", "b"]).await;

    let err = engine
        .resolver()
        .submit_request(&event, &warming.id, &p("a"), vec![p("b")], true)
        .await
        .unwrap_err();
    assert!(matches!(err, CliqueError::InvalidInput(_)));

    let done = completed_group(&engine, &event, &["c", "d"]).await;
    let err = engine
        .resolver()
        .submit_request(&event, &done.id, &p("a"), vec![p("c")], true)
        .await
        .unwrap_err();
    assert!(matches!(err, CliqueError::NotAMember { .. }));

    submit(&engine, &done, "c", &["d"]).await;
    let err = engine
        .resolver()
        .submit_request(&event, &done.id, &p("c"), vec![p("d")], true)
        .await
        .unwrap_err();
    assert!(matches!(err, CliqueError::DuplicateMatchRequest { .. }));
}
