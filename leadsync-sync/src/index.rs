//! Per-cycle correlation between lead ids and the tasks that embed them.

use std::collections::HashMap;

use leadsync_core::{LeadId, Task, TaskId};

use crate::codec;

/// Result of looking a lead up in the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    /// No task embeds this lead id.
    Missing,
    /// Exactly one task embeds it.
    Found(&'a Task),
    /// More than one task embeds it; neither may be written.
    Conflict(&'a [TaskId]),
}

/// Lead id → task mapping for one snapshot of the board.
///
/// Built by decoding every description once. Tasks without a token are left
/// out entirely. A lead id embedded by several tasks is recorded as a conflict
/// rather than resolved in favour of either task.
#[derive(Debug, Default)]
pub struct CorrelationIndex<'a> {
    managed: Vec<(LeadId, &'a Task)>,
    by_lead: HashMap<LeadId, &'a Task>,
    conflicts: HashMap<LeadId, Vec<TaskId>>,
}

impl<'a> CorrelationIndex<'a> {
    pub fn build(tasks: &'a [Task]) -> Self {
        let mut index = Self::default();
        for task in tasks {
            let Some(lead) = codec::decode(&task.description) else {
                continue;
            };
            index.managed.push((lead.clone(), task));

            if let Some(ids) = index.conflicts.get_mut(&lead) {
                ids.push(task.id.clone());
                continue;
            }
            if let Some(first) = index.by_lead.remove(&lead) {
                tracing::warn!(
                    "lead {} is referenced by tasks {} and {}; leaving both alone",
                    lead,
                    first.id,
                    task.id
                );
                index
                    .conflicts
                    .insert(lead, vec![first.id.clone(), task.id.clone()]);
                continue;
            }
            index.by_lead.insert(lead, task);
        }
        index
    }

    pub fn lookup(&self, lead: &LeadId) -> Lookup<'_> {
        if let Some(ids) = self.conflicts.get(lead) {
            return Lookup::Conflict(ids);
        }
        match self.by_lead.get(lead) {
            Some(task) => Lookup::Found(*task),
            None => Lookup::Missing,
        }
    }

    pub fn is_conflicted(&self, lead: &LeadId) -> bool {
        self.conflicts.contains_key(lead)
    }

    /// Every task carrying a token, with its decoded lead id, in board order.
    pub fn managed(&self) -> impl Iterator<Item = (&LeadId, &'a Task)> + '_ {
        self.managed.iter().map(|(lead, task)| (lead, *task))
    }

    /// Number of distinct lead ids correlated to exactly one task.
    pub fn len(&self) -> usize {
        self.by_lead.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_lead.is_empty()
    }

    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }
}

#[cfg(test)]
mod tests {
    use leadsync_core::ListId;

    use super::*;

    fn task(id: &str, description: &str) -> Task {
        Task {
            id: TaskId::from(id),
            title: format!("title {id}"),
            list: ListId::from("todo"),
            description: description.to_string(),
        }
    }

    fn managed(id: &str, lead: &str) -> Task {
        task(id, &codec::encode("details", &LeadId::from(lead)))
    }

    #[test]
    fn unmanaged_tasks_are_ignored() {
        let tasks = vec![task("c1", ""), task("c2", "hand written"), managed("c3", "L1")];
        let index = CorrelationIndex::build(&tasks);

        assert_eq!(index.len(), 1);
        assert_eq!(index.managed().count(), 1);
        assert_eq!(index.lookup(&LeadId::from("L1")), Lookup::Found(&tasks[2]));
        assert_eq!(index.lookup(&LeadId::from("L2")), Lookup::Missing);
    }

    #[test]
    fn duplicate_references_become_a_conflict() {
        let tasks = vec![
            managed("c1", "L1"),
            managed("c2", "L1"),
            managed("c3", "L1"),
            managed("c4", "L2"),
        ];
        let index = CorrelationIndex::build(&tasks);

        let expected = [TaskId::from("c1"), TaskId::from("c2"), TaskId::from("c3")];
        assert_eq!(index.lookup(&LeadId::from("L1")), Lookup::Conflict(&expected));
        assert!(index.is_conflicted(&LeadId::from("L1")));
        assert_eq!(index.conflict_count(), 1);
        assert_eq!(index.len(), 1, "only L2 correlates cleanly");
        assert_eq!(index.managed().count(), 4);
    }

    #[test]
    fn empty_board_builds_empty_index() {
        let index = CorrelationIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.conflict_count(), 0);
    }
}
