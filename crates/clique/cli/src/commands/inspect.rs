//! Read-only views over the state file

use super::Session;
use crate::error::CliResult;
use crate::output::{render, render_rows};
use clique_storage::{AuditRecord, QueryWindow};
use clique_types::{EventId, Group, GroupId, MemberRole, Membership};
use tabled::Tabled;

/// Group row for table output
#[derive(Debug, Tabled)]
pub(crate) struct GroupRow {
    id: String,
    name: String,
    status: String,
    capacity: usize,
    locked: String,
}

impl From<&Group> for GroupRow {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.name.clone(),
            status: group.status.to_string(),
            capacity: group.target_capacity,
            locked: match &group.lock {
                Some(lock) => format!("by {}", lock.locked_by),
                None => "-".to_string(),
            },
        }
    }
}

/// Membership row for table output
#[derive(Debug, Tabled)]
pub(crate) struct MemberRow {
    participant: String,
    group: String,
    role: String,
    ready: String,
}

impl From<&Membership> for MemberRow {
    fn from(membership: &Membership) -> Self {
        Self {
            participant: membership.participant_id.to_string(),
            group: membership.group_id.short(),
            role: match &membership.role {
                MemberRole::Member => "member".to_string(),
                MemberRole::Functional(role) => role.clone(),
            },
            ready: if membership.readiness.is_ready() {
                "yes".to_string()
            } else {
                "no".to_string()
            },
        }
    }
}

#[derive(Debug, Tabled)]
struct AuditRow {
    #[tabled(rename = "#")]
    sequence: u64,
    time: String,
    actor: String,
    action: String,
    target: String,
}

impl From<&AuditRecord> for AuditRow {
    fn from(record: &AuditRecord) -> Self {
        Self {
            sequence: record.sequence,
            time: record.event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            actor: record.event.actor.to_string(),
            action: record.event.action.as_str().to_string(),
            target: record.event.target.clone(),
        }
    }
}

/// List the groups of an event in creation order
pub async fn groups(event: String, session: &Session) -> CliResult<()> {
    let groups = session.engine.registry().list(&EventId::new(event)).await?;
    render_rows(&groups, session.output, |g| GroupRow::from(g))
}

/// List the active members of a group
pub async fn members(group: String, session: &Session) -> CliResult<()> {
    let members = session.engine.ledger().members_of(&GroupId::new(group)).await?;
    render_rows(&members, session.output, |m| MemberRow::from(m))
}

/// Show warm-up progress of a group
pub async fn progress(group: String, session: &Session) -> CliResult<()> {
    let progress = session
        .engine
        .lifecycle()
        .progress(&GroupId::new(group))
        .await?;
    render(&progress, session.output, |p| {
        vec![format!(
            "{}/{} ready ({}%, need {}%){}",
            p.ready,
            p.total,
            p.percent,
            p.required_percent,
            if p.is_complete { " complete" } else { "" }
        )]
    })
}

/// Show the newest audit records
pub async fn audit(limit: usize, session: &Session) -> CliResult<()> {
    let records = session
        .engine
        .storage()
        .list_audit(QueryWindow::latest(limit))
        .await?;
    render_rows(&records, session.output, |r| AuditRow::from(r))
}
