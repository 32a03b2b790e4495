//! In-memory repository for task lifecycle tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{HistoryEntryId, Task, TaskChangeSet, TaskComment, TaskHistoryEntry, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
    query::{Page, TaskFilter, TaskQuery},
};

/// Thread-safe in-memory task repository.
///
/// Change sets are validated in full before any state is touched, so a
/// rejected commit leaves the repository exactly as it was.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    comments: HashMap<TaskId, Vec<TaskComment>>,
    history: HashMap<TaskId, Vec<TaskHistoryEntry>>,
    history_ids: HashSet<HistoryEntryId>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

impl InMemoryTaskState {
    fn check_history(&self, entries: &[TaskHistoryEntry]) -> TaskRepositoryResult<()> {
        let mut batch = HashSet::with_capacity(entries.len());
        for entry in entries {
            if self.history_ids.contains(&entry.id()) || !batch.insert(entry.id()) {
                return Err(TaskRepositoryError::DuplicateHistoryEntry(entry.id()));
            }
        }
        Ok(())
    }

    fn append_history(&mut self, task_id: TaskId, entries: Vec<TaskHistoryEntry>) {
        self.history_ids.extend(entries.iter().map(TaskHistoryEntry::id));
        self.history.entry(task_id).or_default().extend(entries);
    }

    fn apply(&mut self, change: TaskChangeSet) -> TaskRepositoryResult<()> {
        match change {
            TaskChangeSet::Create { task, history } => {
                if self.tasks.contains_key(&task.id()) {
                    return Err(TaskRepositoryError::DuplicateTask(task.id()));
                }
                self.check_history(&history)?;
                let task_id = task.id();
                self.tasks.insert(task_id, task);
                self.append_history(task_id, history);
            }
            TaskChangeSet::Update {
                task,
                expected_revision,
                history,
            } => {
                let task_id = task.id();
                let stored = self
                    .tasks
                    .get(&task_id)
                    .ok_or(TaskRepositoryError::NotFound(task_id))?;
                if stored.revision() != expected_revision {
                    return Err(TaskRepositoryError::Conflict {
                        task_id,
                        expected: expected_revision,
                        actual: stored.revision(),
                    });
                }
                self.check_history(&history)?;
                self.tasks.insert(task_id, task);
                self.append_history(task_id, history);
            }
            TaskChangeSet::Delete { task_id } => {
                self.tasks
                    .remove(&task_id)
                    .ok_or(TaskRepositoryError::NotFound(task_id))?;
                self.comments.remove(&task_id);
                if let Some(entries) = self.history.remove(&task_id) {
                    for entry in entries {
                        self.history_ids.remove(&entry.id());
                    }
                }
            }
            TaskChangeSet::Comment { comment } => {
                let task_id = comment.task_id();
                if !self.tasks.contains_key(&task_id) {
                    return Err(TaskRepositoryError::NotFound(task_id));
                }
                self.comments.entry(task_id).or_default().push(comment);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn find_page(&self, query: &TaskQuery) -> TaskRepositoryResult<Page<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut matching: Vec<&Task> = state
            .tasks
            .values()
            .filter(|task| query.filter.matches(task))
            .collect();
        matching.sort_by(|left, right| query.ordering.compare(left, right));

        let total = u64::try_from(matching.len()).map_err(TaskRepositoryError::persistence)?;
        let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.page.page_size()).unwrap_or(usize::MAX);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();
        Ok(Page::new(items, total, query.page))
    }

    async fn count(&self, filter: &TaskFilter) -> TaskRepositoryResult<u64> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let count = state
            .tasks
            .values()
            .filter(|task| filter.matches(task))
            .count();
        u64::try_from(count).map_err(TaskRepositoryError::persistence)
    }

    async fn list_comments(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskComment>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut comments: Vec<TaskComment> = state
            .comments
            .get(&task_id)
            .map(|stored| stored.iter().rev().cloned().collect())
            .unwrap_or_default();
        comments.sort_by(|left, right| right.created_at().cmp(&left.created_at()));
        Ok(comments)
    }

    async fn list_history(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskHistoryEntry>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.history.get(&task_id).cloned().unwrap_or_default())
    }

    async fn commit(&self, change: TaskChangeSet) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        state.apply(change)
    }
}
