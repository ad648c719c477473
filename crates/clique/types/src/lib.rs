//! Clique domain types
//!
//! Records and pure rules shared by the storage adapters and the engine:
//!
//! - [`Group`] and its [`GroupStatus`] lifecycle table
//! - [`Membership`] with readiness tracking and the exclusivity guards in [`rules`]
//! - [`WarmUpProgressCalculator`] for warm-up readiness
//! - [`MatchRequest`] / [`PersistentGroup`] for post-event matching
//! - [`AuditEvent`] and [`Notification`] payloads handed to collaborators
//!
//! Nothing in this crate performs I/O. Storage adapters evaluate the guards
//! in [`rules`] inside their own atomic write step.

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod audit;
pub mod error;
pub mod event;
pub mod group;
pub mod ids;
pub mod matching;
pub mod membership;
pub mod notification;
pub mod readiness;
pub mod recommendation;
pub mod rules;

pub use audit::{AuditAction, AuditEvent};
pub use error::{CliqueError, CliqueResult};
pub use event::EventRecord;
pub use group::{
    ApprovalChange, ApprovalRecord, FormationProvenance, Group, GroupStatus, LockState, NewGroup,
};
pub use ids::{ActorId, EventId, GroupId, MatchRequestId, ParticipantId, PersistentGroupId};
pub use matching::{MatchRequest, NewMatchRequest, PersistentGroup, PersistentMember};
pub use membership::{MemberRole, Membership, MembershipStatus, ReadinessState, ReadinessUpdate};
pub use notification::{Notification, NotificationTarget, TemplateKind};
pub use readiness::{WarmUpProgress, WarmUpProgressCalculator};
pub use recommendation::SuggestedGroup;
pub use rules::TransitionGuard;
