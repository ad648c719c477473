//! Event records
//!
//! Events are owned by an external system. The engine keeps the title (for
//! group naming) and the participant roster (for the unassigned pool).

use crate::{EventId, ParticipantId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The scheduled activity groups are formed for
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    /// Registered participants, in registration order
    pub participants: Vec<ParticipantId>,
    pub created_at: DateTime<Utc>,
}

impl EventRecord {
    pub fn new(id: EventId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            participants: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_participants(mut self, participants: impl IntoIterator<Item = ParticipantId>) -> Self {
        for participant in participants {
            self.add_participant(participant);
        }
        self
    }

    /// Register a participant; registering twice is a no-op
    pub fn add_participant(&mut self, participant: ParticipantId) {
        if !self.participants.contains(&participant) {
            self.participants.push(participant);
        }
    }

    pub fn is_registered(&self, participant: &ParticipantId) -> bool {
        self.participants.contains(participant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_is_deduplicated() {
        let event = EventRecord::new(EventId::new("ev-1"), "Sunday Hike").with_participants(vec![
            ParticipantId::new("a"),
            ParticipantId::new("b"),
            ParticipantId::new("a"),
        ]);
        assert_eq!(event.participants.len(), 2);
        assert!(event.is_registered(&ParticipantId::new("b")));
        assert!(!event.is_registered(&ParticipantId::new("c")));
    }
}
