//! Domain model for the task lifecycle.
//!
//! The task domain holds the status state machine, the authorization
//! policy, and the audit recorder, keeping all infrastructure concerns
//! outside of the domain boundary.

pub mod audit;
mod change_set;
mod comment;
mod error;
mod fields;
mod history;
mod ids;
pub mod policy;
mod priority;
mod status;
mod task;
mod validation;

pub use change_set::TaskChangeSet;
pub use comment::TaskComment;
pub use error::{
    ParseHistoryActionError, ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError,
};
pub use fields::{CommentContent, DueDate, TaskDescription, TaskTitle};
pub use history::{HistoryAction, PersistedHistoryData, TaskHistoryEntry};
pub use ids::{CommentId, HistoryEntryId, TaskId};
pub use policy::{AccessDecision, DenialReason, TaskField};
pub use priority::TaskPriority;
pub use status::TaskStatus;
pub use task::{NewTask, PersistedTaskData, Task};
pub use validation::{FieldError, ValidationErrors};
