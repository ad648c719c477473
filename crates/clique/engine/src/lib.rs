//! Clique engine
//!
//! Coordinates event participants into small groups and carries each group
//! through its readiness lifecycle:
//!
//! - [`MembershipLedger`]: assignment, removal and swap with exclusivity
//! - [`GroupRegistry`]: group records, naming and the lock flag
//! - [`LifecycleStateMachine`]: guarded status transitions and warm-up progress
//! - [`FormationEngine`]: manual assembly and recommender-driven formation
//! - [`MutualMatchResolver`]: persistent groups from reciprocal keep-in-touch picks
//!
//! [`CliqueEngine`] wires them to one storage backend and the injected
//! collaborators (recommender, notifier, audit log).

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]

pub mod collaborators;
pub mod config;
pub mod context;
pub mod engine;
pub mod formation;
pub mod ledger;
pub mod lifecycle;
pub mod registry;
pub mod resolver;

pub use collaborators::{
    AuditLog, CollaboratorError, NoopNotifier, Notifier, Recommender, SequentialRecommender,
    StoreAuditLog, TracingNotifier,
};
pub use config::EngineConfig;
pub use context::EngineContext;
pub use engine::{CliqueEngine, CliqueEngineBuilder};
pub use formation::{ClusterFailure, FormationEngine, FormationReport};
pub use ledger::MembershipLedger;
pub use lifecycle::{LifecycleStateMachine, ReadinessReceipt};
pub use registry::GroupRegistry;
pub use resolver::{match_edges, mutual_set, MatchFailure, MatchRunReport, MutualMatchResolver};
