pub mod init;
pub mod watch;

use colored::Colorize;

use leadsync_client::{AirtableLeadSource, TrelloTaskBoard};
use leadsync_core::Settings;
use leadsync_sync::{PassReport, Reconciler};

pub type HttpReconciler = Reconciler<AirtableLeadSource, TrelloTaskBoard>;

/// Wire the HTTP record sources and the configured list policy together.
pub fn reconciler(settings: &Settings) -> HttpReconciler {
    Reconciler::new(
        AirtableLeadSource::new(&settings.airtable),
        TrelloTaskBoard::new(&settings.trello),
        settings.policy(),
    )
}

pub fn banner(mode: &str) {
    let rule = "─".repeat(60).bright_black().to_string();
    println!("{rule}");
    println!("  {}: {mode}", "leadsync".bold());
    println!("  lead table ↔ task board");
    println!("{rule}");
}

pub fn print_pass(report: &PassReport) {
    println!(
        "  {} created, {} updated, {} up to date",
        report.created.to_string().green(),
        report.updated.to_string().yellow(),
        report.unchanged,
    );
    println!(
        "  {} skipped (LOST), {} skipped (in DONE), {} skipped (duplicate reference)",
        report.skipped_lost, report.skipped_done, report.skipped_conflict,
    );
    if let Some(reason) = &report.aborted {
        println!("  {} pass aborted: {reason}", "✗".red());
    }
    if !report.failures.is_empty() {
        println!("  {} failed:", report.failures.len().to_string().red());
        for failure in &report.failures {
            println!("    ✗ {}: {}", failure.record, failure.error);
        }
    }
}
