//! Cycle entrypoints shared by the `init` command and the polling daemon.
//!
//! A cycle fetches one snapshot of each collection, then runs the
//! lead → task pass followed by the task → lead pass against that same
//! snapshot. A task created during this cycle is therefore first seen by the
//! next cycle.
//!
//! Each pass runs behind its own unwind guard: a panic in one pass is logged
//! and reported as an aborted [`PassReport`], and the other pass still runs.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use chrono::{DateTime, Utc};

use leadsync_core::{Lead, LeadSource, Task, TaskBoard};

use crate::engine::{Direction, PassReport, Reconciler};
use crate::error::{snapshot_err, SyncError};

/// Both collections as fetched at the start of a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub leads: Vec<Lead>,
    pub tasks: Vec<Task>,
}

/// Outcome of one full bi-directional cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub lead_count: usize,
    pub task_count: usize,
    pub leads_to_tasks: PassReport,
    pub tasks_to_leads: PassReport,
}

impl CycleReport {
    pub fn writes(&self) -> usize {
        self.leads_to_tasks.writes() + self.tasks_to_leads.writes()
    }

    pub fn failures(&self) -> usize {
        [&self.leads_to_tasks, &self.tasks_to_leads]
            .iter()
            .map(|pass| pass.failures.len() + usize::from(pass.aborted.is_some()))
            .sum()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run one pass, turning a panic into an aborted report.
fn guarded(direction: Direction, pass: impl FnOnce() -> PassReport) -> PassReport {
    match panic::catch_unwind(AssertUnwindSafe(pass)) {
        Ok(report) => report,
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::error!("{direction} pass panicked: {reason}");
            PassReport::aborted(direction, reason)
        }
    }
}

impl<L: LeadSource, B: TaskBoard> Reconciler<L, B> {
    /// Fetch both collections. Either fetch failing fails the snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, SyncError> {
        let leads = self
            .lead_source()
            .fetch_leads()
            .map_err(|e| snapshot_err("lead", e))?;
        tracing::info!("fetched {} leads", leads.len());

        let tasks = self
            .board()
            .fetch_tasks()
            .map_err(|e| snapshot_err("task", e))?;
        tracing::info!("fetched {} tasks", tasks.len());

        Ok(Snapshot { leads, tasks })
    }

    /// Run one bi-directional cycle.
    ///
    /// Only a snapshot failure is returned as an error. Individual write
    /// failures and a panicking pass are reported inside the [`CycleReport`].
    pub fn run_cycle(&self) -> Result<CycleReport, SyncError> {
        let started_at = Utc::now();
        let snapshot = self.snapshot()?;

        let leads_to_tasks = guarded(Direction::LeadsToTasks, || {
            self.sync_leads_to_tasks(&snapshot)
        });
        tracing::info!("{leads_to_tasks}");
        let tasks_to_leads = guarded(Direction::TasksToLeads, || {
            self.sync_tasks_to_leads(&snapshot)
        });
        tracing::info!("{tasks_to_leads}");

        Ok(CycleReport {
            started_at,
            lead_count: snapshot.leads.len(),
            task_count: snapshot.tasks.len(),
            leads_to_tasks,
            tasks_to_leads,
        })
    }

    /// Bootstrap: one lead → task pass against a fresh snapshot.
    ///
    /// Safe to run against a board that already holds correlated tasks; only
    /// leads without a task get one.
    pub fn run_initial(&self) -> Result<PassReport, SyncError> {
        let snapshot = self.snapshot()?;
        let report = guarded(Direction::LeadsToTasks, || self.sync_leads_to_tasks(&snapshot));
        tracing::info!("{report}");
        Ok(report)
    }
}
