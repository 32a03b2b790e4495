//! Read-side service: task lists, dashboards, and statistics.

use super::error::{MissingEntity, TaskServiceError, TaskServiceResult, authorize};
use crate::config::TaskPolicyConfig;
use crate::task::{
    domain::{Task, TaskPriority, TaskStatus, policy},
    ports::TaskRepository,
    query::{
        Page, PageRequest, TaskFilter, TaskListParams, TaskOrdering, TaskQuery, TaskSortField,
    },
};
use crate::user::{
    domain::{Actor, User, UserId, Username},
    ports::{UserRepository, UserSummary},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::sync::Arc;

/// A listed task with its due-date state at the time of the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListItem {
    /// The task.
    pub task: Task,
    /// Whether the task is past due and still open.
    pub is_overdue: bool,
    /// Whole days until due; `None` once completed.
    pub days_until_due: Option<i64>,
}

impl TaskListItem {
    fn at(task: Task, now: DateTime<Utc>) -> Self {
        Self {
            is_overdue: task.is_overdue(now),
            days_until_due: task.days_until_due(now),
            task,
        }
    }
}

/// Task counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Tasks not yet started.
    pub not_started: u64,
    /// Tasks in progress.
    pub in_progress: u64,
    /// Completed tasks.
    pub completed: u64,
}

/// Task counts per priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    /// Low priority tasks.
    pub low: u64,
    /// Medium priority tasks.
    pub medium: u64,
    /// High priority tasks.
    pub high: u64,
    /// Urgent tasks.
    pub urgent: u64,
}

/// Status totals for one set of tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskBreakdown {
    /// All tasks in the set.
    pub total: u64,
    /// Per-status counts.
    pub by_status: StatusCounts,
    /// Open tasks past their due date.
    pub overdue: u64,
}

/// Overview shown to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminDashboard {
    /// Every task in the system.
    pub total_tasks: u64,
    /// Tasks assigned to the admin.
    pub my_tasks: u64,
    /// Overdue tasks across the system.
    pub overdue_tasks: u64,
    /// Tasks completed today (UTC).
    pub completed_today: u64,
    /// System-wide status distribution.
    pub by_status: StatusCounts,
    /// Most recently created tasks.
    pub recent_tasks: Vec<Task>,
    /// Breakdown of the admin's own tasks.
    pub my_breakdown: TaskBreakdown,
}

/// Overview shown to regular users, scoped to their own tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberDashboard {
    /// Breakdown of the user's tasks.
    pub breakdown: TaskBreakdown,
    /// Open tasks due soonest, not yet overdue.
    pub upcoming: Vec<Task>,
    /// Most recently completed tasks.
    pub recently_completed: Vec<Task>,
}

/// Role-dependent dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Dashboard {
    /// Dashboard for admins.
    Admin(AdminDashboard),
    /// Dashboard for regular users.
    Member(MemberDashboard),
}

/// System-wide statistics for admins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskStatistics {
    /// Every task in the system.
    pub total_tasks: u64,
    /// Per-status counts.
    pub by_status: StatusCounts,
    /// Per-priority counts.
    pub by_priority: PriorityCounts,
    /// Open tasks past their due date.
    pub overdue: u64,
    /// Completed tasks.
    pub completed: u64,
    /// User directory totals.
    pub users: UserSummary,
}

/// Query service over tasks and users.
#[derive(Clone)]
pub struct TaskQueryService<R, U, C>
where
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    tasks: Arc<R>,
    users: Arc<U>,
    clock: Arc<C>,
    config: TaskPolicyConfig,
}

impl<R, U, C> TaskQueryService<R, U, C>
where
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new query service with the default policy.
    #[must_use]
    pub fn new(tasks: Arc<R>, users: Arc<U>, clock: Arc<C>) -> Self {
        Self {
            tasks,
            users,
            clock,
            config: TaskPolicyConfig::default(),
        }
    }

    /// Replaces the policy configuration.
    #[must_use]
    pub const fn with_config(mut self, config: TaskPolicyConfig) -> Self {
        self.config = config;
        self
    }

    /// Lists the tasks visible to `actor` that match `params`.
    ///
    /// Admins see every task and may narrow by `assigned_to`; regular users
    /// see only tasks assigned to them, and `assigned_to` is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] naming each malformed
    /// parameter and [`TaskServiceError::NotFound`] when an admin names a
    /// username that is unknown or could never be valid.
    pub async fn list_tasks(
        &self,
        actor: &Actor,
        params: &TaskListParams,
    ) -> TaskServiceResult<Page<TaskListItem>> {
        let now = self.clock.utc();
        let parsed = params.parse(now, &self.config)?;
        let mut filter = parsed.filter;

        if actor.is_admin() {
            if let Some(name) = parsed.assignee {
                filter.assignee = Some(self.resolve_username(name).await?.id());
            }
        } else {
            filter.assignee = Some(actor.id);
        }

        let page = self
            .tasks
            .find_page(&TaskQuery::new(filter, parsed.ordering, parsed.page))
            .await?;
        Ok(page.map(|task| TaskListItem::at(task, now)))
    }

    /// Builds the dashboard for `actor`'s role.
    ///
    /// Figures are gathered with separate repository reads, so under
    /// concurrent writes they are individually correct but not mutually
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Storage`] when the repository fails.
    pub async fn dashboard(&self, actor: &Actor) -> TaskServiceResult<Dashboard> {
        let now = self.clock.utc();
        if actor.is_admin() {
            self.admin_dashboard(actor.id, now).await.map(Dashboard::Admin)
        } else {
            self.member_dashboard(actor.id, now)
                .await
                .map(Dashboard::Member)
        }
    }

    /// Returns system-wide statistics.
    ///
    /// Like the dashboard, each figure comes from its own read.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::AuthorizationDenied`] for non-admins.
    pub async fn statistics(&self, actor: &Actor) -> TaskServiceResult<TaskStatistics> {
        authorize(actor, policy::can_administer(actor), "statistics")?;
        let now = self.clock.utc();

        let by_status = self.status_counts(&TaskFilter::new()).await?;
        let mut by_priority = PriorityCounts::default();
        for priority in TaskPriority::ALL {
            let count = self
                .tasks
                .count(&TaskFilter::new().with_priority(priority))
                .await?;
            match priority {
                TaskPriority::Low => by_priority.low = count,
                TaskPriority::Medium => by_priority.medium = count,
                TaskPriority::High => by_priority.high = count,
                TaskPriority::Urgent => by_priority.urgent = count,
            }
        }

        Ok(TaskStatistics {
            total_tasks: self.tasks.count(&TaskFilter::new()).await?,
            by_status,
            by_priority,
            overdue: self.tasks.count(&TaskFilter::new().overdue_at(now)).await?,
            completed: by_status.completed,
            users: self.users.summary().await?,
        })
    }

    /// Lists every user, ordered by username.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::AuthorizationDenied`] for non-admins.
    pub async fn list_users(&self, actor: &Actor) -> TaskServiceResult<Vec<User>> {
        authorize(actor, policy::can_administer(actor), "list_users")?;
        Ok(self.users.list().await?)
    }

    async fn resolve_username(&self, name: String) -> TaskServiceResult<User> {
        let found = match Username::new(name.as_str()) {
            Ok(username) => self.users.find_by_username(&username).await?,
            Err(_) => None,
        };
        found.ok_or(TaskServiceError::NotFound(MissingEntity::Username(name)))
    }

    async fn admin_dashboard(
        &self,
        admin: UserId,
        now: DateTime<Utc>,
    ) -> TaskServiceResult<AdminDashboard> {
        let recent = self
            .top(
                TaskFilter::new(),
                TaskOrdering::descending(TaskSortField::CreatedAt),
                self.config.dashboard_recent_limit,
            )
            .await?;
        let completed_today = TaskFilter::new()
            .with_status(TaskStatus::Completed)
            .updated_on(now.date_naive());

        Ok(AdminDashboard {
            total_tasks: self.tasks.count(&TaskFilter::new()).await?,
            my_tasks: self.tasks.count(&TaskFilter::new().assigned_to(admin)).await?,
            overdue_tasks: self.tasks.count(&TaskFilter::new().overdue_at(now)).await?,
            completed_today: self.tasks.count(&completed_today).await?,
            by_status: self.status_counts(&TaskFilter::new()).await?,
            recent_tasks: recent,
            my_breakdown: self.breakdown(admin, now).await?,
        })
    }

    async fn member_dashboard(
        &self,
        member: UserId,
        now: DateTime<Utc>,
    ) -> TaskServiceResult<MemberDashboard> {
        let upcoming = self
            .top(
                TaskFilter::new().assigned_to(member).open().due_from(now),
                TaskOrdering::ascending(TaskSortField::DueDate),
                self.config.dashboard_upcoming_limit,
            )
            .await?;
        let recently_completed = self
            .top(
                TaskFilter::new()
                    .assigned_to(member)
                    .with_status(TaskStatus::Completed),
                TaskOrdering::descending(TaskSortField::UpdatedAt),
                self.config.dashboard_completed_limit,
            )
            .await?;

        Ok(MemberDashboard {
            breakdown: self.breakdown(member, now).await?,
            upcoming,
            recently_completed,
        })
    }

    async fn breakdown(&self, user: UserId, now: DateTime<Utc>) -> TaskServiceResult<TaskBreakdown> {
        let own = TaskFilter::new().assigned_to(user);
        Ok(TaskBreakdown {
            total: self.tasks.count(&own).await?,
            by_status: self.status_counts(&own).await?,
            overdue: self.tasks.count(&own.overdue_at(now)).await?,
        })
    }

    async fn status_counts(&self, scope: &TaskFilter) -> TaskServiceResult<StatusCounts> {
        let mut counts = StatusCounts::default();
        for status in TaskStatus::ALL {
            let count = self
                .tasks
                .count(&scope.clone().with_status(status))
                .await?;
            match status {
                TaskStatus::NotStarted => counts.not_started = count,
                TaskStatus::InProgress => counts.in_progress = count,
                TaskStatus::Completed => counts.completed = count,
            }
        }
        Ok(counts)
    }

    async fn top(
        &self,
        filter: TaskFilter,
        ordering: TaskOrdering,
        limit: u32,
    ) -> TaskServiceResult<Vec<Task>> {
        let query = TaskQuery::new(filter, ordering, PageRequest::first(limit));
        Ok(self.tasks.find_page(&query).await?.items)
    }
}
