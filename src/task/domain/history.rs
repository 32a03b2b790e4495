//! Append-only audit history entries.

use super::{HistoryEntryId, ParseHistoryActionError, TaskId};
use crate::user::domain::UserId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mutation a history entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    /// The task was created.
    Created,
    /// Task details were edited.
    Updated,
    /// The task moved between statuses.
    StatusChanged,
    /// The task changed hands.
    Assigned,
    /// The task was completed.
    Completed,
}

impl HistoryAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::StatusChanged => "status_changed",
            Self::Assigned => "assigned",
            Self::Completed => "completed",
        }
    }
}

impl TryFrom<&str> for HistoryAction {
    type Error = ParseHistoryActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "status_changed" => Ok(Self::StatusChanged),
            "assigned" => Ok(Self::Assigned),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseHistoryActionError(value.to_owned())),
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable record of an observed mutation on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskHistoryEntry {
    id: HistoryEntryId,
    task_id: TaskId,
    actor: UserId,
    action: HistoryAction,
    description: String,
    recorded_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedHistoryData {
    /// Entry identifier.
    pub id: HistoryEntryId,
    /// Owning task.
    pub task_id: TaskId,
    /// User who performed the mutation.
    pub actor: UserId,
    /// Recorded action.
    pub action: HistoryAction,
    /// Human-readable description.
    pub description: String,
    /// When the mutation was committed.
    pub recorded_at: DateTime<Utc>,
}

impl TaskHistoryEntry {
    /// Records a new history entry at the current clock time.
    #[must_use]
    pub fn new(
        task_id: TaskId,
        actor: UserId,
        action: HistoryAction,
        description: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: HistoryEntryId::new(),
            task_id,
            actor,
            action,
            description: description.into(),
            recorded_at: clock.utc(),
        }
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedHistoryData) -> Self {
        Self {
            id: data.id,
            task_id: data.task_id,
            actor: data.actor,
            action: data.action,
            description: data.description,
            recorded_at: data.recorded_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> HistoryEntryId {
        self.id
    }

    /// Returns the owning task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the user who performed the mutation.
    #[must_use]
    pub const fn actor(&self) -> UserId {
        self.actor
    }

    /// Returns the recorded action.
    #[must_use]
    pub const fn action(&self) -> HistoryAction {
        self.action
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns when the mutation was committed.
    #[must_use]
    pub const fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}
