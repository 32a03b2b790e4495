//! Application services for the task lifecycle.
//!
//! [`TaskLifecycleService`] handles every mutation; [`TaskQueryService`]
//! serves lists, dashboards, and statistics. Both report failures as
//! [`TaskServiceError`], which the transport layer classifies through
//! [`TaskServiceError::outcome`].

mod error;
mod lifecycle;
mod query;

pub use error::{MissingEntity, OutcomeKind, TaskServiceError, TaskServiceResult};
pub use lifecycle::{CreateTaskRequest, TaskDetail, TaskLifecycleService, UpdateTaskRequest};
pub use query::{
    AdminDashboard, Dashboard, MemberDashboard, PriorityCounts, StatusCounts, TaskBreakdown,
    TaskListItem, TaskQueryService, TaskStatistics,
};
