//! Reconciliation engine: applies planned actions through the record sources.
//!
//! Writes are issued one at a time. A failing write is logged, recorded in the
//! [`PassReport`], and the pass continues with the next record. After every
//! write attempt the engine pauses for [`MUTATION_PAUSE`] to stay under the
//! stores' rate limits; reads are never throttled.

use std::fmt;
use std::time::Duration;

use leadsync_core::{LeadSource, SourceError, StatusPolicy, TaskBoard};

use crate::index::CorrelationIndex;
use crate::plan::{self, LeadAction, SkipReason, TaskAction};
use crate::pipeline::Snapshot;

/// Pause after each remote write.
pub const MUTATION_PAUSE: Duration = Duration::from_millis(500);

/// Which way a pass converges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LeadsToTasks,
    TasksToLeads,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LeadsToTasks => write!(f, "leads -> tasks"),
            Direction::TasksToLeads => write!(f, "tasks -> leads"),
        }
    }
}

/// A write that was attempted and failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Id of the record the write was issued for (lead id or task id).
    pub record: String,
    pub error: SourceError,
}

/// Outcome counts of one directional pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub direction: Direction,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped_done: usize,
    pub skipped_lost: usize,
    pub skipped_conflict: usize,
    pub skipped_dangling: usize,
    pub failures: Vec<RecordFailure>,
    /// Set when the pass panicked and was cut short; counts above are lost.
    pub aborted: Option<String>,
}

impl PassReport {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            created: 0,
            updated: 0,
            unchanged: 0,
            skipped_done: 0,
            skipped_lost: 0,
            skipped_conflict: 0,
            skipped_dangling: 0,
            failures: Vec::new(),
            aborted: None,
        }
    }

    /// Report for a pass that panicked before it could finish.
    pub fn aborted(direction: Direction, reason: impl Into<String>) -> Self {
        Self {
            aborted: Some(reason.into()),
            ..Self::new(direction)
        }
    }

    /// Write calls issued, successful or not.
    pub fn writes(&self) -> usize {
        self.created + self.updated + self.failures.len()
    }

    fn count_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Lost => self.skipped_lost += 1,
            SkipReason::StickyDone => self.skipped_done += 1,
            SkipReason::Conflict => self.skipped_conflict += 1,
            SkipReason::UpToDate => self.unchanged += 1,
            SkipReason::Dangling => self.skipped_dangling += 1,
        }
    }

    fn fail(&mut self, record: impl ToString, error: SourceError) {
        self.failures.push(RecordFailure {
            record: record.to_string(),
            error,
        });
    }
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} created, {} updated, {} unchanged, {} done-locked, {} lost, {} conflicted, {} dangling, {} failed",
            self.direction,
            self.created,
            self.updated,
            self.unchanged,
            self.skipped_done,
            self.skipped_lost,
            self.skipped_conflict,
            self.skipped_dangling,
            self.failures.len(),
        )?;
        if let Some(reason) = &self.aborted {
            write!(f, " (aborted: {reason})")?;
        }
        Ok(())
    }
}

/// Drives both directions of the lead ↔ task reconciliation.
///
/// Record sources are injected; the engine holds no state between calls.
pub struct Reconciler<L, B> {
    leads: L,
    board: B,
    policy: StatusPolicy,
    pause: Duration,
}

impl<L: LeadSource, B: TaskBoard> Reconciler<L, B> {
    pub fn new(leads: L, board: B, policy: StatusPolicy) -> Self {
        Self {
            leads,
            board,
            policy,
            pause: MUTATION_PAUSE,
        }
    }

    /// Override the post-write pause (tests use `Duration::ZERO`).
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub fn lead_source(&self) -> &L {
        &self.leads
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    /// Converge tasks towards the leads in `snapshot`.
    pub fn sync_leads_to_tasks(&self, snapshot: &Snapshot) -> PassReport {
        let index = CorrelationIndex::build(&snapshot.tasks);
        let plan = plan::plan_tasks(&snapshot.leads, &index, &self.policy);
        let mut report = PassReport::new(Direction::LeadsToTasks);

        for (lead, reason) in plan.skipped {
            match reason {
                SkipReason::StickyDone => tracing::info!("skipping {lead}: task is in DONE"),
                SkipReason::Lost => tracing::debug!("skipping {lead}: lead is LOST"),
                SkipReason::Conflict => {
                    tracing::warn!("skipping {lead}: referenced by more than one task")
                }
                _ => tracing::debug!("up to date: {lead}"),
            }
            report.count_skip(reason);
        }

        for action in plan.actions {
            self.apply_task_action(action, &mut report);
        }

        report
    }

    /// Converge lead statuses towards task placement in `snapshot`.
    pub fn sync_tasks_to_leads(&self, snapshot: &Snapshot) -> PassReport {
        let index = CorrelationIndex::build(&snapshot.tasks);
        let plan = plan::plan_leads(&snapshot.leads, &index, &self.policy);
        let mut report = PassReport::new(Direction::TasksToLeads);

        for (task, reason) in plan.skipped {
            match reason {
                SkipReason::Dangling => {
                    tracing::warn!("task {task} references a lead that no longer exists")
                }
                SkipReason::Conflict => {
                    tracing::warn!("task {task} shares its lead with another task; not updating")
                }
                _ => tracing::debug!("lead already in sync for task {task}"),
            }
            report.count_skip(reason);
        }

        for action in plan.actions {
            self.apply_lead_action(action, &mut report);
        }

        report
    }

    fn apply_task_action(&self, action: TaskAction, report: &mut PassReport) {
        match action {
            TaskAction::Create { lead, task } => {
                tracing::info!("creating task '{}' for {lead}", task.title);
                match self.board.create_task(&task) {
                    Ok(created) => {
                        tracing::info!("created task {} for {lead}", created.id);
                        report.created += 1;
                    }
                    Err(err) => {
                        tracing::error!("failed to create task for {lead}: {err}");
                        report.fail(lead, err);
                    }
                }
            }
            TaskAction::Update { lead, task, patch } => {
                tracing::info!(
                    "updating task {task} for {lead} -> '{}'",
                    patch.title.as_deref().unwrap_or_default()
                );
                match self.board.update_task(&task, &patch) {
                    Ok(_) => report.updated += 1,
                    Err(err) => {
                        tracing::error!("failed to update task {task}: {err}");
                        report.fail(task, err);
                    }
                }
            }
        }
        self.throttle();
    }

    fn apply_lead_action(&self, action: LeadAction, report: &mut PassReport) {
        tracing::info!(
            "marking {} as {} (task {} is in DONE)",
            action.lead,
            action.status,
            action.task
        );
        match self.leads.update_lead_status(&action.lead, &action.status) {
            Ok(_) => report.updated += 1,
            Err(err) => {
                tracing::error!("failed to update lead {}: {err}", action.lead);
                report.fail(action.lead, err);
            }
        }
        self.throttle();
    }

    fn throttle(&self) {
        if !self.pause.is_zero() {
            std::thread::sleep(self.pause);
        }
    }
}
