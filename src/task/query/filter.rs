//! Composable task predicate.

use crate::task::domain::{Task, TaskPriority, TaskStatus};
use crate::user::domain::UserId;
use chrono::{DateTime, NaiveDate, Utc};

/// Case-insensitive substring searched for in title and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    folded: String,
}

impl SearchTerm {
    /// Creates a search term, or `None` when `value` is blank.
    #[must_use]
    pub fn new(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            raw: trimmed.to_owned(),
            folded: trimmed.to_lowercase(),
        })
    }

    /// Returns the term as supplied, trimmed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns whether `haystack` contains the term, ignoring case.
    #[must_use]
    pub fn found_in(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.folded)
    }
}

/// Conjunction of independently optional task predicates.
///
/// An empty filter matches every task. Each populated field narrows the
/// match further.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Only tasks held by this user.
    pub assignee: Option<UserId>,
    /// Only tasks in this status.
    pub status: Option<TaskStatus>,
    /// Exclude completed tasks.
    pub open_only: bool,
    /// Only tasks with this priority.
    pub priority: Option<TaskPriority>,
    /// Only tasks due on this calendar day (UTC).
    pub due_on: Option<NaiveDate>,
    /// Only tasks due at or after this instant.
    pub due_from: Option<DateTime<Utc>>,
    /// Only tasks due at or before this instant.
    pub due_until: Option<DateTime<Utc>>,
    /// Only tasks overdue as of this instant.
    pub overdue_as_of: Option<DateTime<Utc>>,
    /// Only tasks last modified on this calendar day (UTC).
    pub updated_on: Option<NaiveDate>,
    /// Only tasks whose title or description contains this term.
    pub search: Option<SearchTerm>,
}

impl TaskFilter {
    /// Creates a filter matching every task.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to tasks held by `assignee`.
    #[must_use]
    pub const fn assigned_to(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Restricts to tasks in `status`.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Excludes completed tasks.
    #[must_use]
    pub const fn open(mut self) -> Self {
        self.open_only = true;
        self
    }

    /// Restricts to tasks with `priority`.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Restricts to tasks due at or after `from`.
    #[must_use]
    pub const fn due_from(mut self, from: DateTime<Utc>) -> Self {
        self.due_from = Some(from);
        self
    }

    /// Restricts to tasks overdue at `now`.
    #[must_use]
    pub const fn overdue_at(mut self, now: DateTime<Utc>) -> Self {
        self.overdue_as_of = Some(now);
        self
    }

    /// Restricts to tasks last modified on `day`.
    #[must_use]
    pub const fn updated_on(mut self, day: NaiveDate) -> Self {
        self.updated_on = Some(day);
        self
    }

    /// Returns whether `task` satisfies every populated predicate.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.assignee.is_none_or(|id| task.assigned_to() == id)
            && self.status.is_none_or(|status| task.status() == status)
            && (!self.open_only || !task.status().is_done())
            && self.priority.is_none_or(|priority| task.priority() == priority)
            && self
                .due_on
                .is_none_or(|day| task.due_date().date_naive() == day)
            && self.due_from.is_none_or(|from| task.due_date() >= from)
            && self.due_until.is_none_or(|until| task.due_date() <= until)
            && self.overdue_as_of.is_none_or(|now| task.is_overdue(now))
            && self
                .updated_on
                .is_none_or(|day| task.updated_at().date_naive() == day)
            && self.search.as_ref().is_none_or(|term| {
                term.found_in(task.title().as_str()) || term.found_in(task.description().as_str())
            })
    }
}
