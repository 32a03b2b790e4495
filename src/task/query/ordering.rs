//! Allow-listed sort keys for task lists.

use std::cmp::Ordering;

use crate::task::domain::{FieldError, Task};

/// Attribute a task list may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskSortField {
    /// Title, lexicographic.
    Title,
    /// Due instant.
    DueDate,
    /// Status workflow rank.
    Status,
    /// Priority rank.
    Priority,
    /// Creation instant.
    CreatedAt,
    /// Last modification instant. Not accepted from callers.
    UpdatedAt,
}

impl TaskSortField {
    /// Keys callers may name in a `sort_by` parameter.
    pub const ALLOWED: [Self; 5] = [
        Self::Title,
        Self::DueDate,
        Self::Status,
        Self::Priority,
        Self::CreatedAt,
    ];

    /// Returns the parameter spelling of the key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::DueDate => "due_date",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    fn from_allowed(value: &str) -> Option<Self> {
        Self::ALLOWED
            .into_iter()
            .find(|field| field.as_str() == value)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// A sort key with its direction.
///
/// Ties are broken by creation time (newest first) and then by identifier so
/// pagination is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskOrdering {
    field: TaskSortField,
    direction: SortDirection,
}

impl Default for TaskOrdering {
    fn default() -> Self {
        Self::descending(TaskSortField::CreatedAt)
    }
}

impl TaskOrdering {
    /// Orders ascending by `field`.
    #[must_use]
    pub const fn ascending(field: TaskSortField) -> Self {
        Self {
            field,
            direction: SortDirection::Ascending,
        }
    }

    /// Orders descending by `field`.
    #[must_use]
    pub const fn descending(field: TaskSortField) -> Self {
        Self {
            field,
            direction: SortDirection::Descending,
        }
    }

    /// Parses a `sort_by` parameter such as `due_date` or `-priority`.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] on `sort_by` when the key is not in
    /// [`TaskSortField::ALLOWED`].
    pub fn parse(value: &str) -> Result<Self, FieldError> {
        let trimmed = value.trim();
        let (direction, key) = trimmed
            .strip_prefix('-')
            .map_or((SortDirection::Ascending, trimmed), |key| {
                (SortDirection::Descending, key)
            });
        let field = TaskSortField::from_allowed(key).ok_or_else(|| {
            let allowed: Vec<&str> = TaskSortField::ALLOWED
                .iter()
                .map(|field| field.as_str())
                .collect();
            FieldError::new(
                "sort_by",
                format!(
                    "unsupported sort key '{trimmed}'; expected one of {} (prefix with '-' for descending)",
                    allowed.join(", ")
                ),
            )
        })?;
        Ok(Self { field, direction })
    }

    /// Returns the sort key.
    #[must_use]
    pub const fn field(&self) -> TaskSortField {
        self.field
    }

    /// Returns the direction.
    #[must_use]
    pub const fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Compares two tasks under this ordering.
    #[must_use]
    pub fn compare(&self, left: &Task, right: &Task) -> Ordering {
        let primary = match self.field {
            TaskSortField::Title => left.title().as_str().cmp(right.title().as_str()),
            TaskSortField::DueDate => left.due_date().cmp(&right.due_date()),
            TaskSortField::Status => left.status().rank().cmp(&right.status().rank()),
            TaskSortField::Priority => left.priority().rank().cmp(&right.priority().rank()),
            TaskSortField::CreatedAt => left.created_at().cmp(&right.created_at()),
            TaskSortField::UpdatedAt => left.updated_at().cmp(&right.updated_at()),
        };
        let directed = match self.direction {
            SortDirection::Ascending => primary,
            SortDirection::Descending => primary.reverse(),
        };
        directed
            .then_with(|| right.created_at().cmp(&left.created_at()))
            .then_with(|| left.id().cmp(&right.id()))
    }
}
