//! Clique storage abstractions.
//!
//! This crate defines the storage contract for the clique engine:
//! - event records (title + roster)
//! - groups with lock state and compare-and-set status transitions
//! - memberships with guarded assign / unassign / swap
//! - keep-in-touch requests and the persistent groups built from them
//! - an append-only, hash-linked audit chain
//!
//! Every guarded mutation is a single trait call. Adapters must evaluate the
//! guards from `clique_types::rules` and apply the change in one atomic step
//! (one critical section, or one database transaction).

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

pub mod memory;
mod model;
mod traits;

pub use memory::{InMemoryCliqueStorage, StoreSnapshot};
pub use model::{
    AssignMember, Assignment, AuditRecord, LockChange, MatchCommit, QueryWindow, StatusChange,
    SwapOutcome,
};
pub use traits::{AuditStore, CliqueStorage, EventStore, GroupStore, MatchStore, MembershipStore};
