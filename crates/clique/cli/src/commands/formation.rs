//! Recommender-driven group formation

use super::Session;
use crate::error::CliResult;
use crate::output::render;
use clique_types::EventId;
use tracing::info;

/// Form groups from the unassigned pool of an event
pub async fn auto_form(event: String, size: usize, session: &Session) -> CliResult<()> {
    let event_id = EventId::new(event);
    let report = session
        .engine
        .formation()
        .auto_generate(&event_id, size, &session.actor)
        .await?;
    info!(
        event_id = %event_id,
        created = report.created.len(),
        failures = report.failures.len(),
        "Auto-formation finished"
    );
    if !report.created.is_empty() {
        session.save()?;
    }

    render(&report, session.output, |r| {
        let mut lines = vec![format!("Created {} groups", r.created.len())];
        lines.extend(r.created.iter().map(|id| format!("  {}", id)));
        for failure in &r.failures {
            lines.push(format!(
                "  cluster {} skipped: {}",
                failure.cluster_index, failure.reason
            ));
        }
        lines
    })
}
