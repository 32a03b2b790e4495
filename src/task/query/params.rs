//! Raw list parameters and their validation.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::{PageRequest, SearchTerm, TaskFilter, TaskOrdering};
use crate::config::TaskPolicyConfig;
use crate::task::domain::{FieldError, TaskPriority, TaskStatus, ValidationErrors};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Unparsed list parameters as received from a caller.
///
/// Every parameter is optional; blank values are treated as absent.
///
/// # Examples
///
/// ```
/// use taskboard::task::query::TaskListParams;
///
/// let params = TaskListParams::new()
///     .status("in_progress")
///     .sort_by("-priority")
///     .page_size("50");
/// assert_eq!(params.status.as_deref(), Some("in_progress"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListParams {
    /// Exact status (`not_started`, `in_progress`, `completed`).
    pub status: Option<String>,
    /// Exact priority (`low`, `medium`, `high`, `urgent`).
    pub priority: Option<String>,
    /// Exact due day, `YYYY-MM-DD`.
    pub due_date: Option<String>,
    /// Earliest due day, inclusive.
    pub due_date_from: Option<String>,
    /// Latest due day, inclusive.
    pub due_date_to: Option<String>,
    /// `true` to show only overdue tasks.
    pub overdue: Option<String>,
    /// Substring matched against title and description.
    pub search: Option<String>,
    /// Username whose tasks to show. Honoured for administrators only.
    pub assigned_to: Option<String>,
    /// Sort key, optionally prefixed with `-` for descending.
    pub sort_by: Option<String>,
    /// One-based page number.
    pub page: Option<String>,
    /// Items per page.
    pub page_size: Option<String>,
}

macro_rules! param_setter {
    ($($name:ident),* $(,)?) => {
        $(
            #[doc = concat!("Sets the `", stringify!($name), "` parameter.")]
            #[must_use]
            pub fn $name(mut self, value: impl Into<String>) -> Self {
                self.$name = Some(value.into());
                self
            }
        )*
    };
}

impl TaskListParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    param_setter!(
        status,
        priority,
        due_date,
        due_date_from,
        due_date_to,
        overdue,
        search,
        assigned_to,
        sort_by,
        page,
        page_size,
    );

    /// Validates every parameter, reporting all failures together.
    ///
    /// `now` anchors the overdue filter. The returned filter carries no
    /// assignee; resolving `assigned_to` needs the user directory and is
    /// left to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] naming each malformed parameter.
    pub fn parse(
        &self,
        now: DateTime<Utc>,
        config: &TaskPolicyConfig,
    ) -> Result<ParsedTaskListParams, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut filter = TaskFilter::new();

        filter.status = collect(&mut errors, parse_status(present(self.status.as_deref())));
        filter.priority = collect(
            &mut errors,
            parse_priority(present(self.priority.as_deref())),
        );
        filter.due_on = collect(
            &mut errors,
            parse_day("due_date", present(self.due_date.as_deref())),
        );
        filter.due_from = collect(
            &mut errors,
            parse_day("due_date_from", present(self.due_date_from.as_deref())),
        )
        .map(start_of_day);
        filter.due_until = collect(
            &mut errors,
            parse_day("due_date_to", present(self.due_date_to.as_deref())),
        )
        .map(end_of_day);
        let overdue = collect(&mut errors, parse_flag("overdue", present(self.overdue.as_deref())));
        if overdue == Some(true) {
            filter.overdue_as_of = Some(now);
        }
        filter.search = present(self.search.as_deref()).and_then(SearchTerm::new);

        let assignee = present(self.assigned_to.as_deref()).map(str::to_owned);

        let ordering = collect(
            &mut errors,
            present(self.sort_by.as_deref())
                .map(TaskOrdering::parse)
                .transpose(),
        )
        .unwrap_or_default();

        let page = collect(&mut errors, parse_positive("page", present(self.page.as_deref())));
        let page_size = collect(
            &mut errors,
            parse_positive("page_size", present(self.page_size.as_deref())),
        );

        errors.into_result()?;
        Ok(ParsedTaskListParams {
            filter,
            assignee,
            ordering,
            page: PageRequest::new(
                page.unwrap_or(1),
                config.clamp_page_size(page_size.unwrap_or(config.default_page_size)),
                config.max_page_size,
            ),
        })
    }
}

/// List parameters after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTaskListParams {
    /// Filter built from every parameter except `assigned_to`.
    pub filter: TaskFilter,
    /// Requested assignee username, trimmed but unchecked.
    ///
    /// Only admins may narrow by assignee, so resolving it against the user
    /// directory is left to the caller.
    pub assignee: Option<String>,
    /// Requested ordering, `-created_at` when absent.
    pub ordering: TaskOrdering,
    /// Requested page, with the size clamped.
    pub page: PageRequest,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

fn collect<T>(errors: &mut ValidationErrors, result: Result<Option<T>, FieldError>) -> Option<T> {
    result.unwrap_or_else(|err| {
        errors.push(err);
        None
    })
}

fn parse_status(value: Option<&str>) -> Result<Option<TaskStatus>, FieldError> {
    value
        .map(|raw| {
            TaskStatus::try_from(raw).map_err(|_| {
                let allowed: Vec<&str> = TaskStatus::ALL.iter().copied().map(TaskStatus::as_str).collect();
                FieldError::new(
                    "status",
                    format!("unknown status '{raw}'; expected one of {}", allowed.join(", ")),
                )
            })
        })
        .transpose()
}

fn parse_priority(value: Option<&str>) -> Result<Option<TaskPriority>, FieldError> {
    value
        .map(|raw| {
            TaskPriority::try_from(raw).map_err(|_| {
                let allowed: Vec<&str> = TaskPriority::ALL.iter().copied().map(TaskPriority::as_str).collect();
                FieldError::new(
                    "priority",
                    format!("unknown priority '{raw}'; expected one of {}", allowed.join(", ")),
                )
            })
        })
        .transpose()
}

fn parse_day(name: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, FieldError> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_| FieldError::new(name, format!("invalid date '{raw}'; use YYYY-MM-DD")))
        })
        .transpose()
}

fn parse_flag(name: &'static str, value: Option<&str>) -> Result<Option<bool>, FieldError> {
    value
        .map(|raw| match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(FieldError::new(
                name,
                format!("expected a boolean, got '{raw}'"),
            )),
        })
        .transpose()
}

fn parse_positive(name: &'static str, value: Option<&str>) -> Result<Option<u32>, FieldError> {
    value
        .map(|raw| {
            raw.parse::<u32>()
                .ok()
                .filter(|parsed| *parsed >= 1)
                .ok_or_else(|| {
                    FieldError::new(name, format!("expected a positive integer, got '{raw}'"))
                })
        })
        .transpose()
}

fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_hms_nano_opt(23, 59, 59, 999_999_999)
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN))
        .and_utc()
}
