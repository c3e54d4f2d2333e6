//! Terminal output rendering for divergence reports.
//!
//! Prints one block per direction, listing grouped findings with the
//! caller that made the diverging call.

use super::schema::{DirectionReport, DivergenceGroup, DivergenceReason, DivergenceReport};
use colored::*;

/// Render a human-readable summary of a divergence report for the terminal
///
/// At most `max_groups` groups are listed per direction; the rest are
/// summarized in a trailing "... and M more" line.
pub fn render_terminal_report(report: &DivergenceReport, max_groups: usize) -> String {
    let mut out = String::new();

    out.push_str(&render_header(report));
    out.push_str(&render_direction(&report.target_divergences, max_groups));
    out.push_str(&render_direction(&report.baseline_divergences, max_groups));
    out.push_str(&render_status(report));

    out
}

fn render_header(report: &DivergenceReport) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&"Calling Context Comparison".bold().to_string());
    out.push_str("\n---------------------------------------------------\n");
    out.push_str(&format!(
        "Baseline: {} ({} calls, depth {})\n",
        report.baseline.label, report.baseline.call_count, report.baseline.max_depth
    ));
    out.push_str(&format!(
        "Target:   {} ({} calls, depth {})\n",
        report.target.label, report.target.call_count, report.target.max_depth
    ));
    out.push_str("---------------------------------------------------\n\n");
    out
}

fn render_direction(direction: &DirectionReport, max_groups: usize) -> String {
    let mut out = format!(
        "{} diverged from {} in {} places:\n",
        direction.source.bold(),
        direction.other.bold(),
        direction.divergence_count
    );

    for group in direction.groups.iter().take(max_groups) {
        out.push_str(&render_group(group));
    }

    if direction.groups.len() > max_groups {
        out.push_str(&format!(
            "  ... and {} more\n",
            direction.groups.len() - max_groups
        ));
    }

    out.push('\n');
    out
}

fn render_group(group: &DivergenceGroup) -> String {
    let location = match &group.caller {
        Some(caller) => format!("which was called by {}", caller),
        None => "at the top level".to_string(),
    };

    let repeat = if group.occurrences > 1 {
        format!(" (x{})", group.occurrences)
    } else {
        String::new()
    };

    format!(
        "  {} {}{}\n    {}\n",
        group.name.yellow(),
        location,
        repeat,
        group_reasons(group).dimmed()
    )
}

fn group_reasons(group: &DivergenceGroup) -> String {
    let mut reasons = Vec::new();
    if group.stack_not_found > 0 {
        reasons.push(DivergenceReason::StackNotFound.describe(&group.name));
    }
    if group.insufficient_calls > 0 {
        reasons.push(DivergenceReason::InsufficientCallCount.describe(&group.name));
    }
    reasons.join(" ")
}

fn render_status(report: &DivergenceReport) -> String {
    let mut out = String::new();
    out.push_str("---------------------------------------------------\n");
    let status_msg = if report.has_divergences() {
        format!(
            "STATUS: DIVERGED ({} diverging calls)",
            report.summary.total_divergences
        )
        .red()
        .bold()
    } else {
        "STATUS: IDENTICAL".green().bold()
    };
    out.push_str(&status_msg.to_string());
    out.push('\n');
    out
}
