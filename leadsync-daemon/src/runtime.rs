use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use leadsync_core::{LeadSource, TaskBoard};
use leadsync_sync::{CycleReport, Reconciler};

use crate::error::DaemonError;

/// Totals for one run of the polling loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub cycles: u64,
    /// Cycles that produced no report (snapshot failure or a panic).
    pub failed_cycles: u64,
    /// Write calls issued across all cycles, successful or not.
    pub writes: usize,
}

/// Start the polling loop on a fresh runtime and block until it exits.
pub fn start_blocking<L, B>(
    reconciler: Reconciler<L, B>,
    interval: Duration,
) -> Result<LoopSummary, DaemonError>
where
    L: LeadSource + Send + Sync + 'static,
    B: TaskBoard + Send + Sync + 'static,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(DaemonError::Runtime)?;
    runtime.block_on(run(Arc::new(reconciler), interval))
}

/// Run cycles every `interval` until ctrl-c.
///
/// An interrupt that arrives mid-cycle lets that cycle finish; the loop then
/// exits instead of sleeping. Writes already issued are never rolled back.
pub async fn run<L, B>(
    reconciler: Arc<Reconciler<L, B>>,
    interval: Duration,
) -> Result<LoopSummary, DaemonError>
where
    L: LeadSource + Send + Sync + 'static,
    B: TaskBoard + Send + Sync + 'static,
{
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(4);

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, stopping after the current cycle");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Signal(err)),
                    }
                }
            }
        })
    };

    let summary = run_until(reconciler, interval, shutdown_rx).await;

    let _ = shutdown_tx.send(());
    handle_join("signal_handler", signal_handle.await)?;
    Ok(summary)
}

/// Run cycles every `interval` until a message (or closure) on `shutdown_rx`.
///
/// The first cycle starts immediately. Each cycle runs on the blocking pool,
/// so a panic inside it is caught here, logged, and counted as a failed cycle.
pub async fn run_until<L, B>(
    reconciler: Arc<Reconciler<L, B>>,
    interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> LoopSummary
where
    L: LeadSource + Send + Sync + 'static,
    B: TaskBoard + Send + Sync + 'static,
{
    let mut summary = LoopSummary::default();

    loop {
        summary.cycles += 1;
        tracing::info!(cycle = summary.cycles, "starting sync cycle");

        let cycle = {
            let reconciler = reconciler.clone();
            tokio::task::spawn_blocking(move || reconciler.run_cycle()).await
        };

        match cycle {
            Ok(Ok(report)) => {
                summary.writes += report.writes();
                log_cycle(summary.cycles, &report);
            }
            Ok(Err(err)) => {
                summary.failed_cycles += 1;
                tracing::error!(cycle = summary.cycles, error = %err, "sync cycle skipped");
            }
            Err(err) => {
                summary.failed_cycles += 1;
                tracing::error!(cycle = summary.cycles, error = %err, "sync cycle aborted");
            }
        }

        tracing::debug!(interval_secs = interval.as_secs(), "waiting until next sync");
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    tracing::info!(
        cycles = summary.cycles,
        failed_cycles = summary.failed_cycles,
        writes = summary.writes,
        "sync stopped",
    );
    summary
}

fn log_cycle(cycle: u64, report: &CycleReport) {
    let failures = report.failures();
    if failures > 0 {
        tracing::warn!(
            cycle,
            started_at = %report.started_at,
            failures,
            "sync cycle completed with failures",
        );
    }
    tracing::info!(
        cycle,
        leads = report.lead_count,
        tasks = report.task_count,
        created = report.leads_to_tasks.created,
        tasks_updated = report.leads_to_tasks.updated,
        leads_updated = report.tasks_to_leads.updated,
        done_locked = report.leads_to_tasks.skipped_done,
        "sync cycle completed",
    );
}

fn handle_join(
    task: &'static str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Join {
            task,
            message: err.to_string(),
        }),
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info`.
///
/// Also captures `log` records from the sync engine and HTTP adapters.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    use leadsync_core::{
        memory::{MemoryLeadSource, MemoryTaskBoard},
        Lead, LeadId, LeadStatus, SourceError, StatusPolicy,
    };

    fn jane() -> Lead {
        Lead {
            id: LeadId::from("recJane"),
            name: "Jane".to_string(),
            status: LeadStatus::New,
            email: None,
            source: None,
        }
    }

    fn reconciler<L: LeadSource>(leads: L) -> Arc<Reconciler<L, MemoryTaskBoard>> {
        Arc::new(
            Reconciler::new(
                leads,
                MemoryTaskBoard::new(vec![]),
                StatusPolicy::new("todo", "done"),
            )
            .with_pause(Duration::ZERO),
        )
    }

    struct PanickingLeads;

    impl LeadSource for PanickingLeads {
        fn fetch_leads(&self) -> Result<Vec<Lead>, SourceError> {
            panic!("lead store adapter bug");
        }

        fn update_lead_status(
            &self,
            _id: &LeadId,
            _status: &LeadStatus,
        ) -> Result<Lead, SourceError> {
            unreachable!("never reached: fetch panics first")
        }
    }

    #[tokio::test]
    async fn pending_shutdown_runs_exactly_one_cycle() {
        let r = reconciler(MemoryLeadSource::new(vec![jane()]));
        let (tx, rx) = broadcast::channel(1);
        tx.send(()).expect("send shutdown");

        let summary = run_until(r.clone(), Duration::from_secs(3600), rx).await;

        assert_eq!(summary.cycles, 1);
        assert_eq!(summary.failed_cycles, 0);
        assert_eq!(summary.writes, 1);
        assert_eq!(r.board().tasks().len(), 1);
    }

    #[tokio::test]
    async fn snapshot_failure_does_not_stop_the_loop() {
        let leads = MemoryLeadSource::new(vec![jane()]);
        leads.fail_fetch(true);
        let r = reconciler(leads);
        let (tx, rx) = broadcast::channel(1);
        tx.send(()).expect("send shutdown");

        let summary = run_until(r.clone(), Duration::from_secs(3600), rx).await;

        assert_eq!(summary.cycles, 1);
        assert_eq!(summary.failed_cycles, 1);
        assert!(r.board().calls().is_empty());
    }

    #[tokio::test]
    async fn panic_inside_a_cycle_is_contained() {
        let r = reconciler(PanickingLeads);
        let (tx, rx) = broadcast::channel(1);
        tx.send(()).expect("send shutdown");

        let summary = run_until(r, Duration::from_secs(3600), rx).await;

        assert_eq!(summary.cycles, 1);
        assert_eq!(summary.failed_cycles, 1);
    }

    #[tokio::test]
    async fn repeated_cycles_converge_then_write_nothing() {
        let r = reconciler(MemoryLeadSource::new(vec![jane()]));
        let (tx, rx) = broadcast::channel(1);

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            let _ = tx.send(());
        });

        let summary = run_until(r.clone(), Duration::from_millis(10), rx).await;
        stopper.await.expect("stopper");

        assert!(summary.cycles >= 2, "got {} cycles", summary.cycles);
        assert_eq!(summary.failed_cycles, 0);
        assert_eq!(summary.writes, 1, "only the first cycle creates the task");
        assert_eq!(r.board().tasks().len(), 1);
    }

    #[tokio::test]
    async fn closed_shutdown_channel_stops_the_loop() {
        let r = reconciler(MemoryLeadSource::new(vec![]));
        let (tx, rx) = broadcast::channel::<()>(1);
        drop(tx);

        let summary = run_until(r, Duration::from_secs(3600), rx).await;
        assert_eq!(summary.cycles, 1);
    }
}
