//! Repository port for task persistence, querying, and audit trails.

use crate::task::domain::{
    HistoryEntryId, Task, TaskChangeSet, TaskComment, TaskHistoryEntry, TaskId,
};
use crate::task::query::{Page, TaskFilter, TaskQuery};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// All writes go through [`TaskRepository::commit`], which applies a
/// [`TaskChangeSet`] atomically: either every row it names is written or
/// none is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns one page of tasks matching the query, in query order.
    async fn find_page(&self, query: &TaskQuery) -> TaskRepositoryResult<Page<Task>>;

    /// Counts tasks matching the filter.
    ///
    /// Each call reads its own snapshot. Callers that combine several counts
    /// get figures that may disagree by the writes committed in between;
    /// dashboards and statistics accept that.
    async fn count(&self, filter: &TaskFilter) -> TaskRepositoryResult<u64>;

    /// Returns the comments on a task, newest first.
    async fn list_comments(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskComment>>;

    /// Returns the history of a task in the order it was appended.
    async fn list_history(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskHistoryEntry>>;

    /// Applies a change set atomically.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when a created task's
    /// identifier is taken, [`TaskRepositoryError::NotFound`] when an
    /// updated, deleted, or commented task does not exist,
    /// [`TaskRepositoryError::Conflict`] when the stored revision differs
    /// from the expected one or a history entry identifier is reused, and
    /// [`TaskRepositoryError::Persistence`] on storage failure. Nothing is
    /// written when an error is returned.
    async fn commit(&self, change: TaskChangeSet) -> TaskRepositoryResult<()>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// The task changed since it was read.
    #[error("task {task_id} was modified concurrently (expected revision {expected}, found {actual})")]
    Conflict {
        /// Task whose write was rejected.
        task_id: TaskId,
        /// Revision the writer read.
        expected: u64,
        /// Revision currently stored.
        actual: u64,
    },

    /// A history entry identifier was already recorded.
    #[error("duplicate history entry identifier: {0}")]
    DuplicateHistoryEntry(HistoryEntryId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
