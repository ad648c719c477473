//! Keep-in-touch requests and the mutual-match pass

use super::Session;
use crate::error::CliResult;
use crate::output::{render, render_rows};
use clique_types::{GroupId, ParticipantId, PersistentGroup};
use tabled::Tabled;

/// Record a member's keep-in-touch selections for a completed group
pub async fn keep(
    group: String,
    participant: String,
    picks: Vec<String>,
    opt_out: bool,
    session: &Session,
) -> CliResult<()> {
    let engine = &session.engine;
    let group = engine.registry().get(&GroupId::new(group)).await?;
    let request = engine
        .resolver()
        .submit_request(
            &group.event_id,
            &group.id,
            &ParticipantId::new(participant),
            picks.into_iter().map(ParticipantId::new).collect(),
            !opt_out,
        )
        .await?;
    session.save()?;
    render(&request, session.output, |r| {
        if r.wants_to_keep {
            vec![format!(
                "Request #{} from {} selects {} members",
                r.submission_seq,
                r.requester,
                r.selections.len()
            )]
        } else {
            vec![format!("{} opted out of keeping in touch", r.requester)]
        }
    })
}

/// Run one resolver pass over all pending requests
pub async fn resolve(session: &Session) -> CliResult<()> {
    let report = session.engine.resolver().run().await?;
    if report.requests_processed > 0 {
        session.save()?;
    }
    render(&report, session.output, |r| {
        let mut lines = vec![format!(
            "Processed {} requests across {} groups, created {} persistent groups",
            r.requests_processed,
            r.origin_groups_considered,
            r.persistent_groups_created.len()
        )];
        for created in &r.persistent_groups_created {
            let members: Vec<String> = created
                .participant_ids()
                .iter()
                .map(ToString::to_string)
                .collect();
            lines.push(format!("  {}: {}", created.name, members.join(", ")));
        }
        if r.skipped_concurrent > 0 {
            lines.push(format!("  {} batches already handled", r.skipped_concurrent));
        }
        for failure in &r.failures {
            lines.push(format!("  {} failed: {}", failure.origin_group_id, failure.reason));
        }
        lines
    })
}

#[derive(Debug, Tabled)]
struct CrewRow {
    id: String,
    name: String,
    members: usize,
    leader: String,
}

/// List persistent groups created so far
pub async fn crews(session: &Session) -> CliResult<()> {
    let crews = session.engine.storage().list_persistent_groups().await?;
    render_rows(&crews, session.output, |crew: &PersistentGroup| CrewRow {
        id: crew.id.short(),
        name: crew.name.clone(),
        members: crew.members.len(),
        leader: crew.leader().map(ToString::to_string).unwrap_or_default(),
    })
}
