//! Pure convergence planning for both directions.
//!
//! Planning reads a snapshot and never calls a record source, so every
//! decision rule (LOST exclusion, sticky DONE, idempotence, dangling and
//! duplicate references) is decided here and applied elsewhere.

use std::collections::HashMap;

use leadsync_core::{
    Lead, LeadId, LeadStatus, NewTask, StatusPolicy, TaskId, TaskPatch,
};

use crate::codec;
use crate::index::{CorrelationIndex, Lookup};

/// Why a record produced no write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Lead is LOST; it never gets a task and its existing task is left alone.
    Lost,
    /// Task sits in DONE; automated placement never overrides it.
    StickyDone,
    /// More than one task references the lead.
    Conflict,
    /// Already converged.
    UpToDate,
    /// Task references a lead missing from the snapshot.
    Dangling,
}

/// A write against the task board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskAction {
    Create { lead: LeadId, task: NewTask },
    Update { lead: LeadId, task: TaskId, patch: TaskPatch },
}

/// A status write against the lead store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadAction {
    pub lead: LeadId,
    pub task: TaskId,
    pub status: LeadStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPlan {
    pub actions: Vec<TaskAction>,
    pub skipped: Vec<(LeadId, SkipReason)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadPlan {
    pub actions: Vec<LeadAction>,
    pub skipped: Vec<(TaskId, SkipReason)>,
}

/// Lead → task direction.
///
/// For each non-LOST lead: create a task in the policy list when none exists;
/// otherwise, unless the task is in DONE, update list and title when either
/// differs from what the lead currently implies.
pub fn plan_tasks(leads: &[Lead], index: &CorrelationIndex<'_>, policy: &StatusPolicy) -> TaskPlan {
    let mut plan = TaskPlan::default();

    for lead in leads {
        let Some(target) = policy.target_list(&lead.status) else {
            plan.skipped.push((lead.id.clone(), SkipReason::Lost));
            continue;
        };
        let title = lead.task_title();

        match index.lookup(&lead.id) {
            Lookup::Conflict(_) => plan.skipped.push((lead.id.clone(), SkipReason::Conflict)),
            Lookup::Missing => plan.actions.push(TaskAction::Create {
                lead: lead.id.clone(),
                task: NewTask {
                    title,
                    description: codec::encode(&lead.details(), &lead.id),
                    list: target.clone(),
                },
            }),
            Lookup::Found(task) if policy.is_done(&task.list) => {
                plan.skipped.push((lead.id.clone(), SkipReason::StickyDone));
            }
            Lookup::Found(task) => {
                if &task.list == target && task.title == title {
                    plan.skipped.push((lead.id.clone(), SkipReason::UpToDate));
                } else {
                    plan.actions.push(TaskAction::Update {
                        lead: lead.id.clone(),
                        task: task.id.clone(),
                        patch: TaskPatch {
                            title: Some(title),
                            list: Some(target.clone()),
                            description: None,
                        },
                    });
                }
            }
        }
    }

    plan
}

/// Task → lead direction.
///
/// Only tasks in a list the policy maps back to a status (DONE) are
/// considered. A lead already holding that status, a reference to a lead not
/// in the snapshot, and a lead referenced by several tasks all produce no
/// write. LOST is not exempt: a LOST lead whose task reaches DONE is
/// qualified.
pub fn plan_leads(leads: &[Lead], index: &CorrelationIndex<'_>, policy: &StatusPolicy) -> LeadPlan {
    let statuses: HashMap<&LeadId, &LeadStatus> =
        leads.iter().map(|lead| (&lead.id, &lead.status)).collect();
    let mut plan = LeadPlan::default();

    for (lead, task) in index.managed() {
        let Some(desired) = policy.status_for_list(&task.list) else {
            continue;
        };
        if index.is_conflicted(lead) {
            plan.skipped.push((task.id.clone(), SkipReason::Conflict));
            continue;
        }
        match statuses.get(lead) {
            None => plan.skipped.push((task.id.clone(), SkipReason::Dangling)),
            Some(current) if **current == desired => {
                plan.skipped.push((task.id.clone(), SkipReason::UpToDate));
            }
            Some(_) => plan.actions.push(LeadAction {
                lead: lead.clone(),
                task: task.id.clone(),
                status: desired,
            }),
        }
    }

    plan
}
