//! Record source contracts.
//!
//! Both stores are reached through these traits so the reconciliation engine
//! can be driven by HTTP adapters in production and by the in-memory sources
//! in [`crate::memory`] under test. Calls are blocking and sequential.
//!
//! A fetch that fails returns `Err`, never an empty `Vec`: an empty collection
//! always means the store is genuinely empty.

use crate::error::SourceError;
use crate::types::{Lead, LeadId, LeadStatus, NewTask, Task, TaskId, TaskPatch};

/// The store that owns leads.
pub trait LeadSource {
    /// Every lead in the store, following pagination until exhausted.
    fn fetch_leads(&self) -> Result<Vec<Lead>, SourceError>;

    /// Set one lead's status and return the updated record.
    fn update_lead_status(&self, id: &LeadId, status: &LeadStatus) -> Result<Lead, SourceError>;
}

/// The board that owns tasks.
pub trait TaskBoard {
    /// Every task on the board, following pagination until exhausted.
    fn fetch_tasks(&self) -> Result<Vec<Task>, SourceError>;

    fn create_task(&self, task: &NewTask) -> Result<Task, SourceError>;

    fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, SourceError>;
}
