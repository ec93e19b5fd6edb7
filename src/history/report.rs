//! Console rendering of replay progress

use super::{EventKind, EventReport, ReplaySummary};
use colored::*;

const MESSAGE_WIDTH: usize = 60;

/// First line of `message`, cut to at most 60 characters
pub fn truncate_message(message: &str) -> String {
    let first = message.lines().next().unwrap_or("");
    first.chars().take(MESSAGE_WIDTH).collect()
}

fn glyph(report: &EventReport) -> ColoredString {
    if !report.succeeded() {
        return "✗".red().bold();
    }
    match report.kind {
        EventKind::Merge => "⚡".yellow().bold(),
        EventKind::Tag => "🏷".cyan().bold(),
        EventKind::Change | EventKind::Deletion => "✓".green().bold(),
    }
}

/// One status line per event, plus indented warnings and failure detail
pub fn render_event(report: &EventReport) -> String {
    let body = match report.kind {
        EventKind::Change | EventKind::Deletion => {
            format!("{}: {}", report.author, truncate_message(&report.label))
        }
        EventKind::Merge => report.label.clone(),
        EventKind::Tag => format!("Tagged {}", report.label),
    };

    let mut out = format!(
        "{} [{}] {}",
        glyph(report),
        report.timestamp.to_string().dimmed(),
        body
    );

    for warning in &report.warnings {
        out.push_str(&format!("\n    {} {}", "!".yellow(), warning.dimmed()));
    }
    if let Some(detail) = report.outcome.describe() {
        out.push_str(&format!("\n    {}", detail.red()));
    }
    out
}

pub fn render_summary(summary: &ReplaySummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "=".repeat(50)));

    if summary.failures == 0 {
        out.push_str(&format!("{}\n", "✓ History replayed successfully".green().bold()));
    } else {
        out.push_str(&format!(
            "{}\n",
            format!("✗ History replayed with {} failed event(s)", summary.failures)
                .yellow()
                .bold()
        ));
    }
    out.push_str(&format!("{}\n\n", "=".repeat(50)));

    out.push_str("Summary:\n");
    out.push_str(&format!("- Events replayed: {}\n", summary.events));
    out.push_str(&format!("- Total commits: {}\n", summary.commits));
    out.push_str(&format!("- Merges: {}\n", summary.merges));
    if let (Some(first), Some(last)) = (summary.first_timestamp, summary.last_timestamp) {
        out.push_str(&format!(
            "- Date range: {} to {}\n",
            first.datetime().format("%Y-%m-%d"),
            last.datetime().format("%Y-%m-%d")
        ));
    }
    if !summary.tags.is_empty() {
        out.push_str(&format!("- Tagged version: {}\n", summary.tags.join(", ")));
    }

    out.push_str("\nNext steps:\n");
    out.push_str("1. Verify: git log --oneline --graph --all\n");
    out.push_str("2. Check authors: git shortlog -sn --all\n");
    out
}
