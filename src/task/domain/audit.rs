//! Derives audit history entries from observed task mutations.
//!
//! The recorder compares the task as it was read with the task about to be
//! written and emits one entry per tracked change. Services place the
//! entries in the same [`super::TaskChangeSet`] as the task write, so the
//! audit trail commits or rolls back with the mutation it describes.

use super::{HistoryAction, Task, TaskHistoryEntry};
use crate::user::domain::{Actor, User, UserId, Username};
use mockable::Clock;
use std::collections::HashMap;

/// Display names for the users a history description mentions.
///
/// Unknown users fall back to their identifier so a missing account never
/// blocks the audit trail.
#[derive(Debug, Clone, Default)]
pub struct UserLabels {
    names: HashMap<UserId, Username>,
}

impl UserLabels {
    /// Creates an empty label set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the username of `user`.
    #[must_use]
    pub fn with(mut self, user: &User) -> Self {
        self.names.insert(user.id(), user.username().clone());
        self
    }

    /// Returns the username for `id`, or the identifier when unknown.
    #[must_use]
    pub fn label(&self, id: UserId) -> String {
        self.names
            .get(&id)
            .map_or_else(|| id.to_string(), |name| name.as_str().to_owned())
    }
}

/// Builds the `created` entry for a new task, attributed to its creator.
#[must_use]
pub fn record_creation(task: &Task, labels: &UserLabels, clock: &impl Clock) -> TaskHistoryEntry {
    TaskHistoryEntry::new(
        task.id(),
        task.created_by(),
        HistoryAction::Created,
        format!(
            "Task created and assigned to {}",
            labels.label(task.assigned_to())
        ),
        clock,
    )
}

/// Builds the entries describing how `before` became `after`.
///
/// Emits an `assigned` entry when the assignee changed and a
/// `status_changed` entry when the status changed, in that order. Both are
/// attributed to `actor`. Other field edits are not tracked.
#[must_use]
pub fn record_changes(
    before: &Task,
    after: &Task,
    actor: &Actor,
    labels: &UserLabels,
    clock: &impl Clock,
) -> Vec<TaskHistoryEntry> {
    let mut entries = Vec::with_capacity(2);

    if before.assigned_to() != after.assigned_to() {
        entries.push(TaskHistoryEntry::new(
            after.id(),
            actor.id,
            HistoryAction::Assigned,
            format!(
                "Task reassigned from {} to {}",
                labels.label(before.assigned_to()),
                labels.label(after.assigned_to())
            ),
            clock,
        ));
    }

    if before.status() != after.status() {
        entries.push(TaskHistoryEntry::new(
            after.id(),
            actor.id,
            HistoryAction::StatusChanged,
            format!(
                "Status changed from {} to {}",
                before.status(),
                after.status()
            ),
            clock,
        ));
    }

    entries
}
