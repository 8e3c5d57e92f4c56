//! In-memory record sources.
//!
//! Both keep their records behind a `Mutex` and log every mutation call
//! (successful or not), so callers can assert exactly which writes a
//! reconciliation pass issued. Failures can be injected per record or for the
//! whole fetch.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use crate::error::SourceError;
use crate::source::{LeadSource, TaskBoard};
use crate::types::{Lead, LeadId, LeadStatus, NewTask, Task, TaskId, TaskPatch};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn injected(endpoint: &str) -> SourceError {
    SourceError::Status {
        endpoint: endpoint.to_string(),
        status: 503,
        body: "injected failure".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Leads
// ---------------------------------------------------------------------------

/// A status update that was requested, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub id: LeadId,
    pub status: LeadStatus,
}

#[derive(Debug, Default)]
pub struct MemoryLeadSource {
    leads: Mutex<Vec<Lead>>,
    updates: Mutex<Vec<StatusUpdate>>,
    failing: Mutex<HashSet<LeadId>>,
    fail_fetch: Mutex<bool>,
}

impl MemoryLeadSource {
    pub fn new(leads: Vec<Lead>) -> Self {
        Self {
            leads: Mutex::new(leads),
            ..Self::default()
        }
    }

    pub fn leads(&self) -> Vec<Lead> {
        lock(&self.leads).clone()
    }

    pub fn lead(&self, id: &LeadId) -> Option<Lead> {
        lock(&self.leads).iter().find(|l| &l.id == id).cloned()
    }

    /// Change a lead out-of-band, as a user editing the store would.
    pub fn set_status(&self, id: &LeadId, status: LeadStatus) {
        if let Some(lead) = lock(&self.leads).iter_mut().find(|l| &l.id == id) {
            lead.status = status;
        }
    }

    /// Every status update requested so far, including failed ones.
    pub fn updates(&self) -> Vec<StatusUpdate> {
        lock(&self.updates).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.updates).clear();
    }

    /// Make updates to `id` fail.
    pub fn fail_updates_for(&self, id: impl Into<LeadId>) {
        lock(&self.failing).insert(id.into());
    }

    pub fn fail_fetch(&self, fail: bool) {
        *lock(&self.fail_fetch) = fail;
    }
}

impl LeadSource for MemoryLeadSource {
    fn fetch_leads(&self) -> Result<Vec<Lead>, SourceError> {
        if *lock(&self.fail_fetch) {
            return Err(injected("memory://leads"));
        }
        Ok(self.leads())
    }

    fn update_lead_status(&self, id: &LeadId, status: &LeadStatus) -> Result<Lead, SourceError> {
        lock(&self.updates).push(StatusUpdate {
            id: id.clone(),
            status: status.clone(),
        });
        if lock(&self.failing).contains(id) {
            return Err(injected(&format!("memory://leads/{id}")));
        }
        let mut leads = lock(&self.leads);
        let lead = leads
            .iter_mut()
            .find(|l| &l.id == id)
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
        lead.status = status.clone();
        Ok(lead.clone())
    }
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// A mutation issued against the board, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCall {
    Create(NewTask),
    Update { id: TaskId, patch: TaskPatch },
}

#[derive(Debug, Default)]
pub struct MemoryTaskBoard {
    tasks: Mutex<Vec<Task>>,
    calls: Mutex<Vec<BoardCall>>,
    failing_titles: Mutex<HashSet<String>>,
    failing_ids: Mutex<HashSet<TaskId>>,
    fail_fetch: Mutex<bool>,
    next_id: Mutex<u64>,
}

impl MemoryTaskBoard {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    pub fn tasks(&self) -> Vec<Task> {
        lock(&self.tasks).clone()
    }

    pub fn task(&self, id: &TaskId) -> Option<Task> {
        lock(&self.tasks).iter().find(|t| &t.id == id).cloned()
    }

    /// Move a task out-of-band, as a user dragging a card would.
    pub fn move_task(&self, id: &TaskId, list: impl Into<crate::types::ListId>) {
        if let Some(task) = lock(&self.tasks).iter_mut().find(|t| &t.id == id) {
            task.list = list.into();
        }
    }

    pub fn calls(&self) -> Vec<BoardCall> {
        lock(&self.calls).clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.calls).clear();
    }

    /// Make creation of a task with this exact title fail.
    pub fn fail_create_titled(&self, title: impl Into<String>) {
        lock(&self.failing_titles).insert(title.into());
    }

    pub fn fail_updates_for(&self, id: impl Into<TaskId>) {
        lock(&self.failing_ids).insert(id.into());
    }

    pub fn fail_fetch(&self, fail: bool) {
        *lock(&self.fail_fetch) = fail;
    }
}

impl TaskBoard for MemoryTaskBoard {
    fn fetch_tasks(&self) -> Result<Vec<Task>, SourceError> {
        if *lock(&self.fail_fetch) {
            return Err(injected("memory://tasks"));
        }
        Ok(self.tasks())
    }

    fn create_task(&self, task: &NewTask) -> Result<Task, SourceError> {
        lock(&self.calls).push(BoardCall::Create(task.clone()));
        if lock(&self.failing_titles).contains(&task.title) {
            return Err(injected("memory://tasks"));
        }
        let id = {
            let mut next = lock(&self.next_id);
            *next += 1;
            TaskId(format!("task-{}", *next))
        };
        let created = Task {
            id,
            title: task.title.clone(),
            list: task.list.clone(),
            description: task.description.clone(),
        };
        lock(&self.tasks).push(created.clone());
        Ok(created)
    }

    fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, SourceError> {
        lock(&self.calls).push(BoardCall::Update {
            id: id.clone(),
            patch: patch.clone(),
        });
        if lock(&self.failing_ids).contains(id) {
            return Err(injected(&format!("memory://tasks/{id}")));
        }
        let mut tasks = lock(&self.tasks);
        let task = tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| SourceError::NotFound(id.to_string()))?;
        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = description.clone();
        }
        if let Some(list) = &patch.list {
            task.list = list.clone();
        }
        Ok(task.clone())
    }
}
