//! Command implementations

pub mod event;
pub mod formation;
pub mod group;
pub mod inspect;
pub mod matching;

use crate::error::CliResult;
use crate::output::OutputFormat;
use crate::state::StateFile;
use clique_engine::CliqueEngine;
use clique_storage::InMemoryCliqueStorage;
use clique_types::ActorId;
use std::sync::Arc;

/// Everything a command needs: the engine over the loaded state file
pub struct Session {
    pub engine: CliqueEngine,
    pub actor: ActorId,
    pub output: OutputFormat,
    storage: Arc<InMemoryCliqueStorage>,
    state: StateFile,
}

impl Session {
    pub fn new(
        engine: CliqueEngine,
        storage: Arc<InMemoryCliqueStorage>,
        state: StateFile,
        actor: ActorId,
        output: OutputFormat,
    ) -> Self {
        Self {
            engine,
            actor,
            output,
            storage,
            state,
        }
    }

    /// Persist the store after a mutating command
    pub fn save(&self) -> CliResult<()> {
        self.state.save(&self.storage)
    }
}
