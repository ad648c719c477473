//! Keep-in-touch requests and the persistent groups built from them

use crate::{EventId, GroupId, MatchRequestId, ParticipantId, PersistentGroupId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A participant's keep-in-touch submission for one finished group
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchRequest {
    pub id: MatchRequestId,
    pub event_id: EventId,
    pub origin_group_id: GroupId,
    pub requester: ParticipantId,
    /// Peers the requester wants to keep, in the order given
    pub selections: Vec<ParticipantId>,
    /// False when the requester opted out of keeping anyone
    pub wants_to_keep: bool,
    pub submitted_at: DateTime<Utc>,
    /// Store-assigned submission order
    pub submission_seq: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

impl MatchRequest {
    pub fn is_pending(&self) -> bool {
        self.processed_at.is_none() && self.wants_to_keep
    }

    pub fn selects(&self, peer: &ParticipantId) -> bool {
        self.selections.contains(peer)
    }
}

/// A keep-in-touch submission before the store accepts it
#[derive(Clone, Debug)]
pub struct NewMatchRequest {
    pub event_id: EventId,
    pub origin_group_id: GroupId,
    pub requester: ParticipantId,
    pub selections: Vec<ParticipantId>,
    pub wants_to_keep: bool,
}

impl NewMatchRequest {
    pub fn new(
        event_id: EventId,
        origin_group_id: GroupId,
        requester: ParticipantId,
        selections: impl IntoIterator<Item = ParticipantId>,
    ) -> Self {
        let selections: Vec<ParticipantId> = selections.into_iter().collect();
        let wants_to_keep = !selections.is_empty();
        Self {
            event_id,
            origin_group_id,
            requester,
            selections,
            wants_to_keep,
        }
    }

    /// Drops duplicates and self-selection, keeping first-seen order
    pub fn normalized(mut self) -> Self {
        let mut seen: Vec<ParticipantId> = Vec::with_capacity(self.selections.len());
        for peer in self.selections.drain(..) {
            if peer != self.requester && !seen.contains(&peer) {
                seen.push(peer);
            }
        }
        self.selections = seen;
        self
    }

    pub fn into_request(self, submission_seq: u64, now: DateTime<Utc>) -> MatchRequest {
        MatchRequest {
            id: MatchRequestId::generate(),
            event_id: self.event_id,
            origin_group_id: self.origin_group_id,
            requester: self.requester,
            selections: self.selections,
            wants_to_keep: self.wants_to_keep,
            submitted_at: now,
            submission_seq,
            processed_at: None,
        }
    }
}

/// A member of a persistent group
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersistentMember {
    pub participant_id: ParticipantId,
    pub is_leader: bool,
    pub joined_at: DateTime<Utc>,
}

/// A group that outlives its event, formed from mutual keep-in-touch picks.
///
/// Not subject to the event lifecycle or any capacity ceiling.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistentGroup {
    pub id: PersistentGroupId,
    pub name: String,
    pub origin_event_id: EventId,
    pub origin_group_id: GroupId,
    pub members: Vec<PersistentMember>,
    pub created_at: DateTime<Utc>,
}

impl PersistentGroup {
    /// The first participant becomes leader
    pub fn new(
        name: impl Into<String>,
        origin_event_id: EventId,
        origin_group_id: GroupId,
        participants: &[ParticipantId],
        now: DateTime<Utc>,
    ) -> Self {
        let members = participants
            .iter()
            .enumerate()
            .map(|(idx, participant_id)| PersistentMember {
                participant_id: participant_id.clone(),
                is_leader: idx == 0,
                joined_at: now,
            })
            .collect();

        Self {
            id: PersistentGroupId::generate(),
            name: name.into(),
            origin_event_id,
            origin_group_id,
            members,
            created_at: now,
        }
    }

    pub fn leader(&self) -> Option<&ParticipantId> {
        self.members
            .iter()
            .find(|m| m.is_leader)
            .map(|m| &m.participant_id)
    }

    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.members.iter().map(|m| m.participant_id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: &str) -> ParticipantId {
        ParticipantId::new(id)
    }

    #[test]
    fn test_normalize_drops_self_and_duplicates() {
        let request = NewMatchRequest::new(
            EventId::new("ev"),
            GroupId::new("g"),
            p("a"),
            vec![p("b"), p("a"), p("c"), p("b")],
        )
        .normalized();
        assert_eq!(request.selections, vec![p("b"), p("c")]);
        assert!(request.wants_to_keep);
    }

    #[test]
    fn test_empty_selection_opts_out() {
        let request = NewMatchRequest::new(EventId::new("ev"), GroupId::new("g"), p("a"), vec![]);
        assert!(!request.wants_to_keep);
        let stored = request.into_request(1, Utc::now());
        assert!(!stored.is_pending());
    }

    #[test]
    fn test_persistent_group_leader_is_first() {
        let group = PersistentGroup::new(
            "Book Club 2",
            EventId::new("ev"),
            GroupId::new("g"),
            &[p("x"), p("y")],
            Utc::now(),
        );
        assert_eq!(group.leader(), Some(&p("x")));
        assert_eq!(group.participant_ids(), vec![p("x"), p("y")]);
    }
}
