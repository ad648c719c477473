//! Strongly-typed identifiers
//!
//! Participant, event and actor identities come from external systems, so
//! every id wraps a string rather than a UUID. Ids minted by the engine
//! itself use UUID v4 text.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create an id from a known string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a new random id
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Short display form (first 8 chars)
            pub fn short(&self) -> String {
                self.0.chars().take(8).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(
    /// Identity of a scheduled event (the activity groups are formed for)
    EventId
);
string_id!(
    /// Identity of an event group (clique)
    GroupId
);
string_id!(
    /// Identity of a participant
    ParticipantId
);
string_id!(
    /// Identity of a group created by the mutual-match resolver
    PersistentGroupId
);
string_id!(
    /// Identity of a keep-in-touch submission
    MatchRequestId
);
string_id!(
    /// Identity of whoever triggered an operation (admin, participant or system)
    ActorId
);

impl ActorId {
    /// The actor used for automatic transitions and batch passes
    pub fn system() -> Self {
        Self::new("system")
    }
}
