//! `leadsync init`: run the bootstrap pass, then exit.

use anyhow::{Context, Result};

use leadsync_core::Settings;

/// Create a task for every non-LOST lead that has none yet.
///
/// Exits non-zero only when the snapshot cannot be fetched; per-lead failures
/// are listed and retried by the next run.
pub fn run(settings: &Settings) -> Result<()> {
    super::banner("initial sync");

    let reconciler = super::reconciler(settings);
    let report = reconciler
        .run_initial()
        .context("initial sync failed")?;

    println!("✓ Initial sync complete");
    super::print_pass(&report);
    Ok(())
}
