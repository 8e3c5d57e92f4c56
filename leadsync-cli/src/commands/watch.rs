//! `leadsync` with no subcommand: continuous sync until ctrl-c.

use anyhow::{Context, Result};

use leadsync_core::Settings;

pub fn run(settings: &Settings) -> Result<()> {
    super::banner(&format!(
        "continuous sync every {}s (ctrl-c to stop)",
        settings.sync_interval.as_secs()
    ));

    let reconciler = super::reconciler(settings);
    let summary = leadsync_daemon::start_blocking(reconciler, settings.sync_interval)
        .context("sync loop exited with error")?;

    println!(
        "Sync stopped after {} cycles ({} failed)",
        summary.cycles, summary.failed_cycles
    );
    Ok(())
}
