//! Status ↔ list placement policy.
//!
//! ```text
//! NEW | CONTACTED | IN_PROGRESS  -> TODO
//! QUALIFIED                      -> DONE
//! LOST                           -> (no task)
//! anything else                  -> TODO
//!
//! task in DONE                   -> lead QUALIFIED
//! ```

use crate::types::{LeadStatus, ListId};

/// Static mapping between lead statuses and the two board lists that matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPolicy {
    pub todo: ListId,
    pub done: ListId,
}

impl StatusPolicy {
    pub fn new(todo: impl Into<ListId>, done: impl Into<ListId>) -> Self {
        Self {
            todo: todo.into(),
            done: done.into(),
        }
    }

    /// List a lead's task belongs in, or `None` when the lead gets no task.
    pub fn target_list(&self, status: &LeadStatus) -> Option<&ListId> {
        match status {
            LeadStatus::Lost => None,
            LeadStatus::Qualified => Some(&self.done),
            LeadStatus::New
            | LeadStatus::Contacted
            | LeadStatus::InProgress
            | LeadStatus::Other(_) => Some(&self.todo),
        }
    }

    /// Lead status implied by a task sitting in `list`. Only DONE implies one.
    pub fn status_for_list(&self, list: &ListId) -> Option<LeadStatus> {
        (list == &self.done).then_some(LeadStatus::Qualified)
    }

    pub fn is_done(&self, list: &ListId) -> bool {
        list == &self.done
    }
}
