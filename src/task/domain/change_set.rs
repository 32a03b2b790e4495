//! Atomic units of work handed to the task repository.

use super::{Task, TaskComment, TaskHistoryEntry, TaskId};

/// Every write produced by one mutation.
///
/// A repository commits a change set completely or not at all, so a task
/// write never lands without the history entries describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskChangeSet {
    /// Insert a new task together with its creation history.
    Create {
        /// Task to insert.
        task: Task,
        /// History entries to append.
        history: Vec<TaskHistoryEntry>,
    },
    /// Replace a stored task, guarded by the revision it was read at.
    Update {
        /// Updated task state.
        task: Task,
        /// Revision the stored task must still have.
        expected_revision: u64,
        /// History entries to append, in order.
        history: Vec<TaskHistoryEntry>,
    },
    /// Remove a task together with its comments and history.
    Delete {
        /// Task to remove.
        task_id: TaskId,
    },
    /// Append a comment.
    Comment {
        /// Comment to insert.
        comment: TaskComment,
    },
}

impl TaskChangeSet {
    /// Builds the change set for a newly created task.
    #[must_use]
    pub const fn create(task: Task, history: Vec<TaskHistoryEntry>) -> Self {
        Self::Create { task, history }
    }

    /// Builds the change set for an update of `previous` into `updated`.
    ///
    /// `updated` receives the revision following `previous`; the repository
    /// rejects the write if someone else committed since `previous` was read.
    #[must_use]
    pub fn update(previous: &Task, updated: &mut Task, history: Vec<TaskHistoryEntry>) -> Self {
        updated.follow_revision(previous);
        Self::Update {
            task: updated.clone(),
            expected_revision: previous.revision(),
            history,
        }
    }

    /// Builds the change set removing a task.
    #[must_use]
    pub const fn delete(task_id: TaskId) -> Self {
        Self::Delete { task_id }
    }

    /// Builds the change set appending a comment.
    #[must_use]
    pub const fn comment(comment: TaskComment) -> Self {
        Self::Comment { comment }
    }

    /// Returns the task the change set writes to.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        match self {
            Self::Create { task, .. } | Self::Update { task, .. } => task.id(),
            Self::Delete { task_id } => *task_id,
            Self::Comment { comment } => comment.task_id(),
        }
    }

    /// Returns the history entries the change set appends.
    #[must_use]
    pub fn history(&self) -> &[TaskHistoryEntry] {
        match self {
            Self::Create { history, .. } | Self::Update { history, .. } => history,
            Self::Delete { .. } | Self::Comment { .. } => &[],
        }
    }
}
