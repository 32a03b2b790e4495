//! Task aggregate root.

use super::{
    DueDate, TaskDescription, TaskDomainError, TaskId, TaskPriority, TaskStatus, TaskTitle,
};
use crate::user::domain::{User, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;

const SECONDS_PER_DAY: i64 = 86_400;

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    description: TaskDescription,
    due_date: DateTime<Utc>,
    status: TaskStatus,
    priority: TaskPriority,
    assigned_to: UserId,
    created_by: UserId,
    revision: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Validated inputs for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Task title.
    pub title: TaskTitle,
    /// Task description.
    pub description: TaskDescription,
    /// Due date inside the accepted window.
    pub due_date: DueDate,
    /// Task priority.
    pub priority: TaskPriority,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: TaskDescription,
    /// Persisted due date, which may since have passed.
    pub due_date: DateTime<Utc>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted priority.
    pub priority: TaskPriority,
    /// Current assignee.
    pub assigned_to: UserId,
    /// Creating user.
    pub created_by: UserId,
    /// Number of committed updates.
    pub revision: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in [`TaskStatus::NotStarted`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InactiveAssignee`] when `assignee` is
    /// disabled.
    pub fn create(
        details: NewTask,
        assignee: &User,
        created_by: UserId,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        ensure_active(assignee)?;
        let timestamp = clock.utc();
        Ok(Self {
            id: TaskId::new(),
            title: details.title,
            description: details.description,
            due_date: details.due_date.into_inner(),
            status: TaskStatus::NotStarted,
            priority: details.priority,
            assigned_to: assignee.id(),
            created_by,
            revision: 0,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            status: data.status,
            priority: data.priority,
            assigned_to: data.assigned_to,
            created_by: data.created_by,
            revision: data.revision,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the due date.
    #[must_use]
    pub const fn due_date(&self) -> DateTime<Utc> {
        self.due_date
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the current assignee.
    #[must_use]
    pub const fn assigned_to(&self) -> UserId {
        self.assigned_to
    }

    /// Returns the creating user.
    #[must_use]
    pub const fn created_by(&self) -> UserId {
        self.created_by
    }

    /// Returns the number of committed updates.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest modification timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when `user` is the assignee or the creator.
    #[must_use]
    pub fn is_participant(&self, user: UserId) -> bool {
        self.assigned_to == user || self.created_by == user
    }

    /// Returns whether the task is past due and not yet completed.
    ///
    /// Always `false` once the task is completed.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_done() && self.due_date < now
    }

    /// Returns whole days until the due date, rounded down.
    ///
    /// Negative for overdue tasks; `None` once the task is completed.
    #[must_use]
    pub fn days_until_due(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.status.is_done() {
            return None;
        }
        Some(
            (self.due_date - now)
                .num_seconds()
                .div_euclid(SECONDS_PER_DAY),
        )
    }

    /// Moves the task to `target`.
    ///
    /// Returns `Ok(false)` without touching the task when `target` equals the
    /// current status: that is not a transition.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the
    /// transition table does not allow the move. The task is left unchanged.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<bool, TaskDomainError> {
        if self.status == target {
            return Ok(false);
        }
        if !self.status.can_transition_to(target) {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(true)
    }

    /// Assigns the task to `assignee`.
    ///
    /// Returns `Ok(false)` when `assignee` already holds the task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InactiveAssignee`] when the new assignee is
    /// disabled.
    pub fn reassign(&mut self, assignee: &User, clock: &impl Clock) -> Result<bool, TaskDomainError> {
        if self.assigned_to == assignee.id() {
            return Ok(false);
        }
        ensure_active(assignee)?;
        self.assigned_to = assignee.id();
        self.touch(clock);
        Ok(true)
    }

    /// Replaces the title. Returns whether it changed.
    pub fn rename(&mut self, title: TaskTitle, clock: &impl Clock) -> bool {
        let changed = replace_field(&mut self.title, title);
        self.touch_if(changed, clock)
    }

    /// Replaces the description. Returns whether it changed.
    pub fn redescribe(&mut self, description: TaskDescription, clock: &impl Clock) -> bool {
        let changed = replace_field(&mut self.description, description);
        self.touch_if(changed, clock)
    }

    /// Moves the due date. Returns whether it changed.
    pub fn reschedule(&mut self, due_date: DueDate, clock: &impl Clock) -> bool {
        let changed = replace_field(&mut self.due_date, due_date.into_inner());
        self.touch_if(changed, clock)
    }

    /// Changes the priority. Returns whether it changed.
    pub fn reprioritize(&mut self, priority: TaskPriority, clock: &impl Clock) -> bool {
        let changed = replace_field(&mut self.priority, priority);
        self.touch_if(changed, clock)
    }

    /// Sets the revision to the one following `previous`.
    pub(crate) const fn follow_revision(&mut self, previous: &Self) {
        self.revision = previous.revision.saturating_add(1);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }

    fn touch_if(&mut self, changed: bool, clock: &impl Clock) -> bool {
        if changed {
            self.touch(clock);
        }
        changed
    }
}

fn ensure_active(assignee: &User) -> Result<(), TaskDomainError> {
    if assignee.is_active() {
        Ok(())
    } else {
        Err(TaskDomainError::InactiveAssignee(assignee.id()))
    }
}

/// Writes `value` into `field` when they differ, reporting whether it did.
fn replace_field<T: PartialEq>(field: &mut T, value: T) -> bool {
    if *field == value {
        return false;
    }
    *field = value;
    true
}
