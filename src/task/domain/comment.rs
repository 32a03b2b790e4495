//! Comments attached to tasks.

use super::{CommentContent, CommentId, TaskId};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

/// An immutable comment left on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskComment {
    id: CommentId,
    task_id: TaskId,
    author: UserId,
    content: CommentContent,
    created_at: DateTime<Utc>,
}

impl TaskComment {
    /// Creates a comment authored by `author`.
    #[must_use]
    pub fn new(task_id: TaskId, author: UserId, content: CommentContent, clock: &impl Clock) -> Self {
        Self {
            id: CommentId::new(),
            task_id,
            author,
            content,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a comment from persisted storage.
    #[must_use]
    pub const fn from_persisted(
        id: CommentId,
        task_id: TaskId,
        author: UserId,
        content: CommentContent,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            task_id,
            author,
            content,
            created_at,
        }
    }

    /// Returns the comment identifier.
    #[must_use]
    pub const fn id(&self) -> CommentId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the author.
    #[must_use]
    pub const fn author(&self) -> UserId {
        self.author
    }

    /// Returns the content.
    #[must_use]
    pub const fn content(&self) -> &CommentContent {
        &self.content
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
