//! CLI output formatting for runs and dry runs.
//!
//! Per-file progress goes through the logger as files are processed; this
//! module renders the blocks printed once at the end.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! Processing complete!
//!   Processed: 2
//!   Skipped (already processed): 1
//!   Errors: 1
//!   Total: 4
//!     duplicates: 1
//!     no author folder: 1
//! ```
//!
//! Skips are duplicates plus name collisions; errors are failures plus files
//! without an author folder. Zero-count detail lines are left out.
//!
//! ## Check
//!
//! ```text
//! 001 alice/a.jpg → alice_20240319_142501_a_3fa9c2d1.jpg
//! 002 bob/b.jpg: duplicate
//! 003 stray.png: no author folder
//! Would convert 1 of 3 files
//! ```
//!
//! # Architecture
//!
//! Each block has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::process::{Decision, PlanEntry, RunSummary};
use std::path::Path;

/// Format a 1-based position as a zero-padded 3-digit string.
fn format_index(pos: usize) -> String {
    format!("{:03}", pos)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Run summary
// ============================================================================

pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![
        "Processing complete!".to_string(),
        format!("  Processed: {}", summary.processed()),
        format!("  Skipped (already processed): {}", summary.skipped()),
        format!("  Errors: {}", summary.errors()),
        format!("  Total: {}", summary.total()),
    ];

    let details = [
        ("duplicates", summary.skipped_duplicate()),
        ("name collisions", summary.skipped_collision()),
        ("no author folder", summary.no_author()),
        ("failed", summary.failed()),
    ];
    for (label, count) in details {
        if count > 0 {
            lines.push(format!("    {}: {}", label, count));
        }
    }

    if !summary.ledger_saved {
        lines.push("Warning: ledger was not saved; these files will be redone next run".into());
    }
    lines
}

pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Check (dry run)
// ============================================================================

pub fn format_plan(entries: &[PlanEntry]) -> Vec<String> {
    let mut lines = Vec::with_capacity(entries.len() + 1);
    let mut converting = 0;

    for (i, entry) in entries.iter().enumerate() {
        let head = format!("{} {}", format_index(i + 1), entry.source.relative);
        let line = match &entry.decision {
            Ok(Decision::Convert { output, .. }) => {
                converting += 1;
                format!("{} → {}", head, file_name(output))
            }
            Ok(Decision::Duplicate) => format!("{}: duplicate", head),
            Ok(Decision::NoAuthor) => format!("{}: no author folder", head),
            Ok(Decision::Collision(output)) => {
                format!("{}: name collision with {}", head, file_name(output))
            }
            Err(e) => format!("{}: error: {}", head, e),
        };
        lines.push(line);
    }

    lines.push(format!(
        "Would convert {} of {} files",
        converting,
        entries.len()
    ));
    lines
}

pub fn print_plan(entries: &[PlanEntry]) {
    for line in format_plan(entries) {
        println!("{}", line);
    }
}
