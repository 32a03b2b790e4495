//! Request-boundary error taxonomy for task services.

use crate::task::domain::{
    AccessDecision, DenialReason, FieldError, TaskDomainError, TaskId, TaskStatus,
    ValidationErrors,
};
use crate::task::ports::TaskRepositoryError;
use crate::user::domain::{Actor, UserId};
use crate::user::ports::UserRepositoryError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Coarse outcome a transport layer maps onto its own response codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// Malformed or out-of-range input.
    Validation,
    /// A status change the state machine forbids.
    InvalidTransition,
    /// The actor lacks permission.
    AuthorizationDenied,
    /// A referenced entity does not exist.
    NotFound,
    /// The write clashes with stored state.
    Conflict,
    /// The backing store failed.
    Internal,
}

impl OutcomeKind {
    /// Returns a stable machine-readable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::InvalidTransition => "invalid_transition",
            Self::AuthorizationDenied => "authorization_denied",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Internal => "internal",
        }
    }
}

/// Entity a request referred to that does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingEntity {
    /// A task looked up by identifier.
    Task(TaskId),
    /// A user looked up by identifier.
    User(UserId),
    /// A user looked up by username.
    Username(String),
}

impl fmt::Display for MissingEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "task {id}"),
            Self::User(id) => write!(f, "user {id}"),
            Self::Username(name) => write!(f, "user '{name}'"),
        }
    }
}

/// Errors returned by task services.
#[derive(Debug, Clone, Error)]
pub enum TaskServiceError {
    /// One or more input fields were rejected.
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The requested status change is not allowed from the current status.
    #[error("invalid status transition for task {task_id}: {from} -> {to}")]
    InvalidTransition {
        /// Task the transition was attempted on.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// The actor is not permitted to perform the operation.
    #[error("authorization denied: {0}")]
    AuthorizationDenied(#[from] DenialReason),

    /// A referenced entity does not exist.
    #[error("{0} not found")]
    NotFound(MissingEntity),

    /// The write conflicts with stored state.
    #[error("conflict: {0}")]
    Conflict(Arc<dyn std::error::Error + Send + Sync>),

    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskServiceError {
    /// Classifies the error for the transport layer.
    #[must_use]
    pub const fn outcome(&self) -> OutcomeKind {
        match self {
            Self::Validation(_) => OutcomeKind::Validation,
            Self::InvalidTransition { .. } => OutcomeKind::InvalidTransition,
            Self::AuthorizationDenied(_) => OutcomeKind::AuthorizationDenied,
            Self::NotFound(_) => OutcomeKind::NotFound,
            Self::Conflict(_) => OutcomeKind::Conflict,
            Self::Storage(_) => OutcomeKind::Internal,
        }
    }
}

impl From<FieldError> for TaskServiceError {
    fn from(error: FieldError) -> Self {
        Self::Validation(ValidationErrors::from(error))
    }
}

impl From<TaskDomainError> for TaskServiceError {
    fn from(error: TaskDomainError) -> Self {
        match error {
            TaskDomainError::InvalidStateTransition { task_id, from, to } => {
                Self::InvalidTransition { task_id, from, to }
            }
            other => Self::from(FieldError::from(other)),
        }
    }
}

impl From<TaskRepositoryError> for TaskServiceError {
    fn from(error: TaskRepositoryError) -> Self {
        match error {
            TaskRepositoryError::NotFound(task_id) => Self::NotFound(MissingEntity::Task(task_id)),
            TaskRepositoryError::Persistence(source) => Self::Storage(source),
            conflict @ (TaskRepositoryError::DuplicateTask(_)
            | TaskRepositoryError::Conflict { .. }
            | TaskRepositoryError::DuplicateHistoryEntry(_)) => Self::Conflict(Arc::new(conflict)),
        }
    }
}

impl From<UserRepositoryError> for TaskServiceError {
    fn from(error: UserRepositoryError) -> Self {
        match error {
            UserRepositoryError::Persistence(source) => Self::Storage(source),
            conflict @ (UserRepositoryError::DuplicateUser(_)
            | UserRepositoryError::DuplicateUsername(_)) => Self::Conflict(Arc::new(conflict)),
        }
    }
}

/// Turns a policy decision into a service result, logging denials.
pub(super) fn authorize(
    actor: &Actor,
    decision: AccessDecision,
    operation: &'static str,
) -> TaskServiceResult<()> {
    decision.into_result().map_err(|reason| {
        warn!(actor_id = %actor.id, operation, %reason, "task operation denied");
        TaskServiceError::AuthorizationDenied(reason)
    })
}
