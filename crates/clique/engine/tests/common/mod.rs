#![allow(dead_code)]

use async_trait::async_trait;
use clique_engine::{
    CliqueEngine, CollaboratorError, EngineConfig, Notifier, Recommender,
};
use clique_types::{
    ActorId, EventId, EventRecord, Group, Notification, ParticipantId, SuggestedGroup,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn p(id: &str) -> ParticipantId {
    ParticipantId::new(id)
}

pub fn admin() -> ActorId {
    ActorId::new("admin-1")
}

/// Keeps every notification for inspection
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), CollaboratorError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _notification: Notification) -> Result<(), CollaboratorError> {
        Err(CollaboratorError::Unavailable("smtp down".into()))
    }
}

/// Answers with a fixed list of clusters
pub struct FixedRecommender(pub Vec<Vec<&'static str>>);

#[async_trait]
impl Recommender for FixedRecommender {
    async fn suggest_groups(
        &self,
        _event_id: &EventId,
        _unassigned: &[ParticipantId],
        _target_size: usize,
    ) -> Result<Vec<SuggestedGroup>, CollaboratorError> {
        Ok(self
            .0
            .iter()
            .map(|cluster| SuggestedGroup {
                member_ids: cluster.iter().map(|id| p(id)).collect(),
                compatibility_score: 0.8,
                formation_reason: "shared interests".into(),
            })
            .collect())
    }
}

pub struct FailingRecommender;

#[async_trait]
impl Recommender for FailingRecommender {
    async fn suggest_groups(
        &self,
        _event_id: &EventId,
        _unassigned: &[ParticipantId],
        _target_size: usize,
    ) -> Result<Vec<SuggestedGroup>, CollaboratorError> {
        Err(CollaboratorError::Unavailable("model offline".into()))
    }
}

pub struct SlowRecommender;

#[async_trait]
impl Recommender for SlowRecommender {
    async fn suggest_groups(
        &self,
        _event_id: &EventId,
        _unassigned: &[ParticipantId],
        _target_size: usize,
    ) -> Result<Vec<SuggestedGroup>, CollaboratorError> {
        tokio::time::sleep(Duration::from_secs(120)).await;
        Ok(Vec::new())
    }
}

pub fn engine_with_notifier(notifier: Arc<dyn Notifier>) -> CliqueEngine {
    CliqueEngine::builder()
        .with_notifier(notifier)
        .with_config(EngineConfig::default().with_default_target_capacity(4))
        .build()
        .unwrap()
}

pub fn engine() -> CliqueEngine {
    engine_with_notifier(Arc::new(RecordingNotifier::default()))
}

pub async fn seed_event(engine: &CliqueEngine, id: &str, title: &str, roster: &[&str]) -> EventId {
    let event_id = EventId::new(id);
    engine
        .registry()
        .register_event(
            EventRecord::new(event_id.clone(), title).with_participants(roster.iter().map(|r| p(r))),
        )
        .await
        .unwrap();
    event_id
}

/// Draft group with the given members, confirmed and locked
pub async fn locked_group(engine: &CliqueEngine, event_id: &EventId, members: &[&str]) -> Group {
    let group = engine
        .formation()
        .create_group(event_id, None, &admin())
        .await
        .unwrap();
    for member in members {
        engine
            .formation()
            .manual_assign(&group.id, &p(member), &admin())
            .await
            .unwrap();
    }
    engine.lifecycle().confirm(&group.id, &admin()).await.unwrap();
    engine.formation().lock(&group.id, &admin()).await.unwrap()
}

/// Group in `warming_up`
pub async fn warming_group(engine: &CliqueEngine, event_id: &EventId, members: &[&str]) -> Group {
    let group = locked_group(engine, event_id, members).await;
    engine
        .lifecycle()
        .begin_warm_up(&group.id, &admin())
        .await
        .unwrap()
}

pub async fn make_ready(engine: &CliqueEngine, group: &Group, member: &str) {
    engine
        .lifecycle()
        .submit_response(&group.id, &p(member), "See you there!")
        .await
        .unwrap();
    engine
        .lifecycle()
        .confirm_readiness(&group.id, &p(member))
        .await
        .unwrap();
}

/// Group walked all the way to `completed`
pub async fn completed_group(engine: &CliqueEngine, event_id: &EventId, members: &[&str]) -> Group {
    let group = warming_group(engine, event_id, members).await;
    for member in members {
        make_ready(engine, &group, member).await;
    }
    engine.lifecycle().approve(&group.id, &admin()).await.unwrap();
    engine.lifecycle().activate(&group.id, &admin()).await.unwrap();
    engine.lifecycle().complete(&group.id, &admin()).await.unwrap()
}
