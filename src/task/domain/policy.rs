//! Role- and ownership-based authorization decisions for task operations.
//!
//! Every function here is pure: it looks only at the actor, the task and
//! the intent, and returns an [`AccessDecision`]. Services consult the
//! policy before touching storage and surface a denial as an error.

use super::{Task, TaskStatus};
use crate::user::domain::{Actor, Role};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Task fields an update request may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskField {
    /// Task title.
    Title,
    /// Task description.
    Description,
    /// Due date.
    DueDate,
    /// Priority.
    Priority,
    /// Lifecycle status.
    Status,
    /// Assignee.
    AssignedTo,
}

impl TaskField {
    /// Returns the request field name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Description => "description",
            Self::DueDate => "due_date",
            Self::Priority => "priority",
            Self::Status => "status",
            Self::AssignedTo => "assigned_to",
        }
    }
}

impl fmt::Display for TaskField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DenialReason {
    /// The actor neither holds nor created the task.
    #[error("only the assignee or creator of a task may access it")]
    NotParticipant,

    /// The operation is reserved for admins.
    #[error("only admins may {action}")]
    AdminOnly {
        /// Refused operation.
        action: &'static str,
    },

    /// The actor is not the task's assignee.
    #[error("only the assignee may change this task")]
    NotAssignee,

    /// A regular user tried to change fields other than status.
    #[error("regular users may only change task status; refused fields: {}", join_fields(.fields))]
    RestrictedFields {
        /// Fields outside the regular user's allowance.
        fields: Vec<TaskField>,
    },

    /// A regular user tried to complete a task past its due date.
    #[error("overdue tasks can only be completed by an admin")]
    OverdueCompletion,
}

fn join_fields(fields: &[TaskField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum AccessDecision {
    /// The operation may proceed.
    Allow,
    /// The operation is refused.
    Deny(DenialReason),
}

impl AccessDecision {
    /// Returns `true` for [`AccessDecision::Allow`].
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Converts the decision into a result.
    ///
    /// # Errors
    ///
    /// Returns the [`DenialReason`] when the decision is a denial.
    pub fn into_result(self) -> Result<(), DenialReason> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason),
        }
    }

    fn deny_unless(allowed: bool, reason: DenialReason) -> Self {
        if allowed { Self::Allow } else { Self::Deny(reason) }
    }
}

/// Fields a regular assignee may change.
const REGULAR_UPDATABLE: [TaskField; 1] = [TaskField::Status];

/// Decides whether `actor` may see `task`.
pub fn can_view(actor: &Actor, task: &Task) -> AccessDecision {
    match actor.role {
        Role::Admin => AccessDecision::Allow,
        Role::Regular => AccessDecision::deny_unless(
            task.is_participant(actor.id),
            DenialReason::NotParticipant,
        ),
    }
}

/// Decides whether `actor` may create tasks.
pub fn can_create_task(actor: &Actor) -> AccessDecision {
    AccessDecision::deny_unless(
        actor.role.is_admin(),
        DenialReason::AdminOnly {
            action: "create tasks",
        },
    )
}

/// Decides whether `actor` may change `changed_fields` on `task`.
///
/// Regular users must be the assignee and may touch status only; any other
/// field in the set refuses the whole update, even alongside status.
pub fn can_update_task(
    actor: &Actor,
    task: &Task,
    changed_fields: &BTreeSet<TaskField>,
) -> AccessDecision {
    match actor.role {
        Role::Admin => AccessDecision::Allow,
        Role::Regular => {
            if task.assigned_to() != actor.id {
                return AccessDecision::Deny(DenialReason::NotAssignee);
            }
            let refused: Vec<TaskField> = changed_fields
                .iter()
                .copied()
                .filter(|field| !REGULAR_UPDATABLE.contains(field))
                .collect();
            AccessDecision::deny_unless(
                refused.is_empty(),
                DenialReason::RestrictedFields { fields: refused },
            )
        }
    }
}

/// Decides whether `actor` may mark `task` completed at `now`.
///
/// Regular assignees cannot complete an overdue task; an admin has to.
pub fn can_complete(actor: &Actor, task: &Task, now: DateTime<Utc>) -> AccessDecision {
    match actor.role {
        Role::Admin => AccessDecision::Allow,
        Role::Regular if task.assigned_to() != actor.id => {
            AccessDecision::Deny(DenialReason::NotAssignee)
        }
        Role::Regular => AccessDecision::deny_unless(
            !task.is_overdue(now),
            DenialReason::OverdueCompletion,
        ),
    }
}

/// Decides whether `actor` may move `task` to `target` at `now`.
///
/// Combines the status-field update rule with the completion rule when the
/// move would complete the task.
pub fn can_change_status(
    actor: &Actor,
    task: &Task,
    target: TaskStatus,
    now: DateTime<Utc>,
) -> AccessDecision {
    let fields = BTreeSet::from([TaskField::Status]);
    let decision = can_update_task(actor, task, &fields);
    if !decision.is_allowed() || !completes(task, target) {
        return decision;
    }
    can_complete(actor, task, now)
}

/// Decides whether `actor` may delete tasks.
pub fn can_delete_task(actor: &Actor) -> AccessDecision {
    AccessDecision::deny_unless(
        actor.role.is_admin(),
        DenialReason::AdminOnly {
            action: "delete tasks",
        },
    )
}

/// Decides whether `actor` may comment on `task`. Anyone who can view it can.
pub fn can_comment(actor: &Actor, task: &Task) -> AccessDecision {
    can_view(actor, task)
}

/// Decides whether `actor` may read admin-wide statistics and user lists.
pub fn can_administer(actor: &Actor) -> AccessDecision {
    AccessDecision::deny_unless(
        actor.role.is_admin(),
        DenialReason::AdminOnly {
            action: "view administrative data",
        },
    )
}

fn completes(task: &Task, target: TaskStatus) -> bool {
    target.is_done() && task.status() != target
}
