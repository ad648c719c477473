//! Event records: title and roster

use super::Session;
use crate::error::CliResult;
use crate::output::{render, render_rows};
use clap::Subcommand;
use clique_types::{CliqueError, EventId, EventRecord, ParticipantId};
use tabled::Tabled;

/// Event commands
#[derive(Subcommand)]
pub enum EventCommands {
    /// Register an event or add participants to its roster
    Add {
        /// Event ID
        #[arg(long)]
        event: String,

        /// Event title, used in group names
        #[arg(long)]
        title: Option<String>,

        /// Participant to register (repeatable)
        #[arg(long = "participant")]
        participants: Vec<String>,
    },

    /// Show an event and its roster
    Show {
        /// Event ID
        #[arg(long)]
        event: String,
    },

    /// List registered participants without a seat
    Unassigned {
        /// Event ID
        #[arg(long)]
        event: String,
    },
}

#[derive(Debug, Tabled)]
struct UnassignedRow {
    participant: String,
}

/// Execute event commands
pub async fn execute(command: EventCommands, session: &Session) -> CliResult<()> {
    let registry = session.engine.registry();
    match command {
        EventCommands::Add {
            event,
            title,
            participants,
        } => {
            let event_id = EventId::new(event);
            let mut record = match registry.event(&event_id).await {
                Ok(existing) => existing,
                Err(CliqueError::EventNotFound(_)) => EventRecord::new(
                    event_id.clone(),
                    title.clone().unwrap_or_else(|| event_id.to_string()),
                ),
                Err(e) => return Err(e.into()),
            };
            if let Some(title) = title {
                record.title = title;
            }
            for participant in participants {
                record.add_participant(ParticipantId::new(participant));
            }
            registry.register_event(record.clone()).await?;
            session.save()?;
            render(&record, session.output, |r| {
                vec![format!(
                    "Event {} \"{}\" with {} participants",
                    r.id,
                    r.title,
                    r.participants.len()
                )]
            })
        }
        EventCommands::Show { event } => {
            let record = registry.event(&EventId::new(event)).await?;
            render(&record, session.output, |r| {
                let mut lines = vec![format!("{} \"{}\"", r.id, r.title)];
                lines.extend(r.participants.iter().map(|p| format!("  {}", p)));
                lines
            })
        }
        EventCommands::Unassigned { event } => {
            let pool = session
                .engine
                .ledger()
                .unassigned_participants(&EventId::new(event))
                .await?;
            render_rows(&pool, session.output, |participant: &ParticipantId| {
                UnassignedRow {
                    participant: participant.to_string(),
                }
            })
        }
    }
}
