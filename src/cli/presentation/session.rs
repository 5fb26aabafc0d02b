//! Generation session presentation: summary lines and export outcomes.

use super::shared::to_pretty_json;
use crate::export::ExportOutcome;
use crate::session::{GenerationSession, SessionStatus};
use owo_colors::OwoColorize;
use serde_json::json;

/// One-paragraph summary printed after the streamed document.
pub fn format_session_summary_text(
    session: &GenerationSession,
    exports: &[ExportOutcome],
) -> String {
    let status = match session.status() {
        SessionStatus::Completed => format!("{}", session.status().green()),
        SessionStatus::Cancelled => format!("{}", session.status().yellow()),
        SessionStatus::Failed => format!("{}", session.status().red()),
        other => other.to_string(),
    };
    let mut out = format!(
        "Session {} ({}): {}\n",
        session.id(),
        session.request().category.slug(),
        status
    );
    out.push_str(&format!(
        "  Delivered: {} / {} bytes\n",
        session.delivered_len(),
        session.full_text().len()
    ));
    if let Some(error) = session.error() {
        out.push_str(&format!("  Error: {}\n", error));
    }
    for outcome in exports {
        out.push_str(&format!("  {}\n", format_export_outcome(outcome)));
    }
    out.trim_end().to_string()
}

pub fn format_session_summary_json(
    session: &GenerationSession,
    exports: &[ExportOutcome],
) -> String {
    let request = session.request();
    let out = json!({
        "session_id": session.id().as_str(),
        "category": request.category.slug(),
        "client_name": request.client(),
        "status": session.status().as_str(),
        "delivered_text": session.delivered_text(),
        "delivered_bytes": session.delivered_len(),
        "total_bytes": session.full_text().len(),
        "error": session.error(),
        "started_at": session.started_at().to_rfc3339(),
        "updated_at": session.updated_at().to_rfc3339(),
        "exports": exports,
    });
    to_pretty_json(&out)
}

pub fn format_export_outcome(outcome: &ExportOutcome) -> String {
    match outcome {
        ExportOutcome::Copied { .. } | ExportOutcome::Downloaded { .. } => {
            format!("{} {}", "✓".green(), outcome)
        }
        ExportOutcome::ClipboardUnavailable { .. } => format!("{} {}", "!".yellow(), outcome),
        ExportOutcome::NothingToExport => format!("{} {}", "-".dimmed(), outcome),
    }
}
