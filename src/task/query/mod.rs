//! Filtered, sorted, paginated views over the task collection.
//!
//! List requests arrive as raw string parameters ([`TaskListParams`]) and
//! are parsed into a composable [`TaskFilter`], an allow-listed
//! [`TaskOrdering`] and a clamped [`PageRequest`]. Repositories evaluate the
//! resulting [`TaskQuery`] natively; the in-memory adapter uses
//! [`TaskFilter::matches`] and [`TaskOrdering::compare`] directly.

mod filter;
mod ordering;
mod page;
mod params;

pub use filter::{SearchTerm, TaskFilter};
pub use ordering::{SortDirection, TaskOrdering, TaskSortField};
pub use page::{Page, PageRequest};
pub use params::{ParsedTaskListParams, TaskListParams};

/// A complete list query: what to match, how to order it, which page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskQuery {
    /// Predicate over tasks.
    pub filter: TaskFilter,
    /// Result ordering.
    pub ordering: TaskOrdering,
    /// Requested page.
    pub page: PageRequest,
}

impl TaskQuery {
    /// Creates a query.
    #[must_use]
    pub const fn new(filter: TaskFilter, ordering: TaskOrdering, page: PageRequest) -> Self {
        Self {
            filter,
            ordering,
            page,
        }
    }
}
