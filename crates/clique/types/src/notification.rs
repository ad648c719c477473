//! Notification requests handed to the notifier collaborator.
//!
//! Rendering and delivery belong to the notifier; the engine only says who,
//! which template and what data.

use crate::{GroupId, ParticipantId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    /// Group entered warm-up; members should submit readiness
    WarmUpStarted,
    /// Group approved; downstream instructions are available
    InstructionsUnlocked,
    /// A persistent group was formed from mutual picks
    MutualMatch,
    GroupCompleted,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTarget {
    /// Every current member of the group
    Group(GroupId),
    Participants(Vec<ParticipantId>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub target: NotificationTarget,
    pub template: TemplateKind,
    #[serde(default)]
    pub payload: Value,
}

impl Notification {
    pub fn to_group(group_id: GroupId, template: TemplateKind, payload: Value) -> Self {
        Self {
            target: NotificationTarget::Group(group_id),
            template,
            payload,
        }
    }

    pub fn to_participant(participant: ParticipantId, template: TemplateKind, payload: Value) -> Self {
        Self {
            target: NotificationTarget::Participants(vec![participant]),
            template,
            payload,
        }
    }
}
