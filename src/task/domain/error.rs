//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title exceeds the schema limit.
    #[error("task title has {actual} characters, exceeds limit of {max}")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// The task description exceeds the schema limit.
    #[error("task description has {actual} characters, exceeds limit of {max}")]
    DescriptionTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// The due date is not strictly after the current time.
    #[error("due date {0} is not in the future")]
    DueDateNotInFuture(DateTime<Utc>),

    /// The due date lies beyond the configured planning horizon.
    #[error("due date {due_date} is more than {max_days} days in the future")]
    DueDateBeyondHorizon {
        /// The rejected due date.
        due_date: DateTime<Utc>,
        /// Configured horizon in days.
        max_days: u32,
    },

    /// The proposed assignee account is disabled.
    #[error("cannot assign task to inactive user {0}")]
    InactiveAssignee(UserId),

    /// The comment is empty after trimming.
    #[error("comment must not be empty")]
    EmptyComment,

    /// The comment exceeds the schema limit.
    #[error("comment has {actual} characters, exceeds limit of {max}")]
    CommentTooLong {
        /// Maximum accepted length.
        max: usize,
        /// Length of the rejected value.
        actual: usize,
    },

    /// The requested status change is not in the transition table.
    #[error("invalid status transition for task {task_id}: {from} -> {to}")]
    InvalidStateTransition {
        /// Task the transition was attempted on.
        task_id: TaskId,
        /// Status before the attempt.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },
}

impl TaskDomainError {
    /// Returns the input field the error refers to, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::EmptyTitle | Self::TitleTooLong { .. } => Some("title"),
            Self::DescriptionTooLong { .. } => Some("description"),
            Self::DueDateNotInFuture(_) | Self::DueDateBeyondHorizon { .. } => Some("due_date"),
            Self::InactiveAssignee(_) => Some("assigned_to"),
            Self::EmptyComment | Self::CommentTooLong { .. } => Some("content"),
            Self::InvalidStateTransition { .. } => Some("status"),
        }
    }
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing history actions from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown history action: {0}")]
pub struct ParseHistoryActionError(pub String);
