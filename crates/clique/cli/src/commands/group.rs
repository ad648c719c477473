//! Group commands: assembly, locks and lifecycle steps

use super::inspect::MemberRow;
use super::Session;
use crate::error::{CliError, CliResult};
use crate::output::{render, render_rows};
use clap::{Subcommand, ValueEnum};
use clique_types::{EventId, Group, GroupId, MemberRole, Membership, ParticipantId};

/// Lifecycle step to apply to a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Step {
    Confirm,
    WarmUp,
    Approve,
    HoldBack,
    Activate,
    Complete,
}

/// Group commands
#[derive(Subcommand)]
pub enum GroupCommands {
    /// Create an empty draft group
    Create {
        /// Event ID
        #[arg(long)]
        event: String,

        /// Target capacity (defaults to the engine setting)
        #[arg(long)]
        capacity: Option<usize>,
    },

    /// Delete an empty draft group
    Discard {
        /// Group ID
        #[arg(long)]
        group: String,
    },

    /// Seat a participant in a forming group
    Assign {
        /// Group ID
        #[arg(long)]
        group: String,

        /// Participant ID
        #[arg(long)]
        participant: String,

        /// Functional role such as "driver"
        #[arg(long)]
        role: Option<String>,
    },

    /// Remove a participant's seat
    Unassign {
        /// Group ID
        #[arg(long)]
        group: String,

        /// Participant ID
        #[arg(long)]
        participant: String,
    },

    /// Mark a member as dropped out
    Drop {
        /// Group ID
        #[arg(long)]
        group: String,

        /// Participant ID
        #[arg(long)]
        participant: String,
    },

    /// Exchange the groups of two seated participants
    Swap {
        /// Event ID
        #[arg(long)]
        event: String,

        /// First participant
        first: String,

        /// Second participant
        second: String,
    },

    /// Freeze the roster
    Lock {
        /// Group ID
        #[arg(long)]
        group: String,
    },

    /// Reopen the roster
    Unlock {
        /// Group ID
        #[arg(long)]
        group: String,
    },

    /// Move a group to its next lifecycle status
    Transition {
        /// Group ID
        #[arg(long)]
        group: String,

        /// Step to apply
        #[arg(long, value_enum)]
        step: Step,
    },

    /// Record a member's warm-up response
    Respond {
        /// Group ID
        #[arg(long)]
        group: String,

        /// Participant ID
        #[arg(long)]
        participant: String,

        /// Response text
        #[arg(long)]
        text: String,
    },

    /// Record a member's readiness confirmation
    Ready {
        /// Group ID
        #[arg(long)]
        group: String,

        /// Participant ID
        #[arg(long)]
        participant: String,
    },
}

fn group_line(group: &Group) -> Vec<String> {
    let lock = if group.is_locked() { " [locked]" } else { "" };
    vec![format!(
        "{}  {}  {}  capacity {}{}",
        group.id, group.name, group.status, group.target_capacity, lock
    )]
}

fn membership_line(membership: &Membership) -> Vec<String> {
    vec![format!(
        "{} seated in {} ({:?})",
        membership.participant_id, membership.group_id, membership.status
    )]
}

/// Execute group commands
pub async fn execute(command: GroupCommands, session: &Session) -> CliResult<()> {
    let engine = &session.engine;
    let actor = &session.actor;
    match command {
        GroupCommands::Create { event, capacity } => {
            let group = engine
                .formation()
                .create_group(&EventId::new(event), capacity, actor)
                .await?;
            session.save()?;
            render(&group, session.output, group_line)
        }
        GroupCommands::Discard { group } => {
            let group = engine
                .formation()
                .discard_group(&GroupId::new(group), actor)
                .await?;
            session.save()?;
            render(&group, session.output, |g| {
                vec![format!("Discarded {} ({})", g.name, g.id)]
            })
        }
        GroupCommands::Assign {
            group,
            participant,
            role,
        } => {
            let group_id = GroupId::new(group);
            let participant_id = ParticipantId::new(participant);
            let membership = match role {
                Some(role) if role.trim().is_empty() => {
                    return Err(CliError::InvalidInput("role must not be blank".into()))
                }
                Some(role) => {
                    engine
                        .ledger()
                        .assign_with_role(
                            &group_id,
                            &participant_id,
                            MemberRole::Functional(role),
                            actor,
                        )
                        .await?
                }
                None => {
                    engine
                        .formation()
                        .manual_assign(&group_id, &participant_id, actor)
                        .await?
                }
            };
            session.save()?;
            render(&membership, session.output, membership_line)
        }
        GroupCommands::Unassign { group, participant } => {
            let removed = engine
                .remove_member(
                    &GroupId::new(group),
                    &ParticipantId::new(participant),
                    actor,
                )
                .await?;
            session.save()?;
            render(&removed, session.output, |removed| match removed {
                Some(m) => vec![format!("Removed {} from {}", m.participant_id, m.group_id)],
                None => vec!["Participant was not seated".to_string()],
            })
        }
        GroupCommands::Drop { group, participant } => {
            let (membership, group) = engine
                .drop_member(
                    &GroupId::new(group),
                    &ParticipantId::new(participant),
                    actor,
                )
                .await?;
            session.save()?;
            render(&membership, session.output, |m| {
                vec![format!(
                    "{} dropped from {} (now {})",
                    m.participant_id, group.name, group.status
                )]
            })
        }
        GroupCommands::Swap {
            event,
            first,
            second,
        } => {
            let swapped = engine
                .formation()
                .swap(
                    &EventId::new(event),
                    &ParticipantId::new(first),
                    &ParticipantId::new(second),
                    actor,
                )
                .await?;
            session.save()?;
            let rows = vec![swapped.first, swapped.second];
            render_rows(&rows, session.output, |m| MemberRow::from(m))
        }
        GroupCommands::Lock { group } => {
            let group = engine.formation().lock(&GroupId::new(group), actor).await?;
            session.save()?;
            render(&group, session.output, group_line)
        }
        GroupCommands::Unlock { group } => {
            let group = engine
                .formation()
                .unlock(&GroupId::new(group), actor)
                .await?;
            session.save()?;
            render(&group, session.output, group_line)
        }
        GroupCommands::Transition { group, step } => {
            let group_id = GroupId::new(group);
            let lifecycle = engine.lifecycle();
            let group = match step {
                Step::Confirm => lifecycle.confirm(&group_id, actor).await?,
                Step::WarmUp => lifecycle.begin_warm_up(&group_id, actor).await?,
                Step::Approve => lifecycle.approve(&group_id, actor).await?,
                Step::HoldBack => lifecycle.hold_back(&group_id, actor).await?,
                Step::Activate => lifecycle.activate(&group_id, actor).await?,
                Step::Complete => lifecycle.complete(&group_id, actor).await?,
            };
            session.save()?;
            render(&group, session.output, group_line)
        }
        GroupCommands::Respond {
            group,
            participant,
            text,
        } => {
            let receipt = engine
                .lifecycle()
                .submit_response(
                    &GroupId::new(group),
                    &ParticipantId::new(participant),
                    &text,
                )
                .await?;
            session.save()?;
            render(&receipt, session.output, |r| {
                vec![format!(
                    "{}/{} ready ({}%), group {}",
                    r.progress.ready, r.progress.total, r.progress.percent, r.status
                )]
            })
        }
        GroupCommands::Ready { group, participant } => {
            let receipt = engine
                .lifecycle()
                .confirm_readiness(&GroupId::new(group), &ParticipantId::new(participant))
                .await?;
            session.save()?;
            render(&receipt, session.output, |r| {
                vec![format!(
                    "{}/{} ready ({}%), group {}",
                    r.progress.ready, r.progress.total, r.progress.percent, r.status
                )]
            })
        }
    }
}
