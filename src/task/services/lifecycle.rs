//! Mutation service for the task lifecycle.
//!
//! Every mutation follows the same shape: load the task, consult the
//! authorization policy, apply the change to a copy, derive the audit
//! entries from the before/after pair, and hand the task write and its
//! history to the repository as one [`TaskChangeSet`].

use super::error::{MissingEntity, TaskServiceError, TaskServiceResult, authorize};
use crate::config::TaskPolicyConfig;
use crate::task::{
    domain::{
        CommentContent, DueDate, FieldError, NewTask, Task, TaskChangeSet, TaskComment,
        TaskDescription, TaskDomainError, TaskField, TaskHistoryEntry, TaskId, TaskPriority,
        TaskStatus, TaskTitle, ValidationErrors,
        audit::{self, UserLabels},
        policy,
    },
    ports::TaskRepository,
};
use crate::user::{
    domain::{Actor, User, UserId},
    ports::UserRepository,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    due_date: DateTime<Utc>,
    priority: TaskPriority,
    assigned_to: UserId,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields and `medium` priority.
    #[must_use]
    pub fn new(title: impl Into<String>, due_date: DateTime<Utc>, assigned_to: UserId) -> Self {
        Self {
            title: title.into(),
            description: None,
            due_date,
            priority: TaskPriority::default(),
            assigned_to,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }
}

/// Request payload for a partial task update.
///
/// Only the fields that are set take part in the update, and they are the
/// fields the authorization policy sees as changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<String>,
    due_date: Option<DateTime<Utc>>,
    priority: Option<TaskPriority>,
    status: Option<TaskStatus>,
    assigned_to: Option<UserId>,
}

impl UpdateTaskRequest {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a new due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets a new priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Sets a new status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets a new assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assigned_to = Some(assignee);
        self
    }

    /// Returns the fields this request supplies.
    #[must_use]
    pub fn changed_fields(&self) -> BTreeSet<TaskField> {
        [
            (self.title.is_some(), TaskField::Title),
            (self.description.is_some(), TaskField::Description),
            (self.due_date.is_some(), TaskField::DueDate),
            (self.priority.is_some(), TaskField::Priority),
            (self.status.is_some(), TaskField::Status),
            (self.assigned_to.is_some(), TaskField::AssignedTo),
        ]
        .into_iter()
        .filter_map(|(present, field)| present.then_some(field))
        .collect()
    }
}

/// A task together with its discussion and audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDetail {
    /// The task.
    pub task: Task,
    /// Comments, newest first.
    pub comments: Vec<TaskComment>,
    /// History entries, newest first.
    pub history: Vec<TaskHistoryEntry>,
    /// Whether the task is past due and still open.
    pub is_overdue: bool,
    /// Whole days until due; `None` once completed.
    pub days_until_due: Option<i64>,
}

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<R, U, C>
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

impl<R, U, C> TaskLifecycleService<R, U, C>
where
    R: TaskRepository,
    U: UserRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service with the default policy.
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

    /// Creates a task on behalf of an admin.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::AuthorizationDenied`] for non-admins,
    /// [`TaskServiceError::NotFound`] when the assignee does not exist, and
    /// [`TaskServiceError::Validation`] listing every rejected field,
    /// including an inactive assignee.
    pub async fn create_task(
        &self,
        actor: &Actor,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        authorize(actor, policy::can_create_task(actor), "create_task")?;

        let now = self.clock.utc();
        let mut errors = ValidationErrors::new();
        let title = errors.check(TaskTitle::new(request.title));
        let description = errors.check(TaskDescription::new(
            request.description.unwrap_or_default(),
        ));
        let due_date = errors.check(DueDate::new(
            request.due_date,
            now,
            self.config.max_due_horizon_days,
        ));

        let assignee = self.require_user(request.assigned_to).await?;
        if !assignee.is_active() {
            errors.push(FieldError::from(TaskDomainError::InactiveAssignee(
                assignee.id(),
            )));
        }

        let checked_details = match (title, description, due_date) {
            (Some(checked_title), Some(checked_description), Some(checked_due_date)) => {
                Some(NewTask {
                    title: checked_title,
                    description: checked_description,
                    due_date: checked_due_date,
                    priority: request.priority,
                })
            }
            _ => None,
        };
        let details = errors.finish(checked_details)?;

        let task = Task::create(details, &assignee, actor.id, &*self.clock)?;
        let labels = UserLabels::new().with(&assignee);
        let history = vec![audit::record_creation(&task, &labels, &*self.clock)];
        self.tasks
            .commit(TaskChangeSet::create(task.clone(), history))
            .await?;

        info!(task_id = %task.id(), actor_id = %actor.id, action = "created", "task created");
        Ok(task)
    }

    /// Applies a partial update.
    ///
    /// The supplied fields are checked against the policy as a set: a
    /// regular assignee may only supply `status`. Completing a task also
    /// consults the completion rule. An update that changes nothing commits
    /// nothing and returns the stored task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] for a missing task or assignee,
    /// [`TaskServiceError::AuthorizationDenied`] when the policy refuses,
    /// [`TaskServiceError::Validation`] for rejected fields,
    /// [`TaskServiceError::InvalidTransition`] for a forbidden status move,
    /// and [`TaskServiceError::Conflict`] when the task changed concurrently.
    pub async fn update_task(
        &self,
        actor: &Actor,
        task_id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let task = self.require_task(task_id).await?;
        let now = self.clock.utc();

        authorize(actor, policy::can_view(actor, &task), "update_task")?;
        authorize(
            actor,
            policy::can_update_task(actor, &task, &request.changed_fields()),
            "update_task",
        )?;
        if let Some(target) = request.status {
            authorize(
                actor,
                policy::can_change_status(actor, &task, target, now),
                "update_task",
            )?;
        }

        let mut labels = UserLabels::new();
        let mut updated = task.clone();
        let mut changed = false;
        let mut errors = ValidationErrors::new();

        if let Some(title) = request.title
            && let Some(checked) = errors.check(TaskTitle::new(title))
        {
            changed |= updated.rename(checked, &*self.clock);
        }
        if let Some(description) = request.description
            && let Some(checked) = errors.check(TaskDescription::new(description))
        {
            changed |= updated.redescribe(checked, &*self.clock);
        }
        if let Some(due_date) = request.due_date.filter(|due| *due != task.due_date())
            && let Some(checked) = errors.check(DueDate::new(
                due_date,
                now,
                self.config.max_due_horizon_days,
            ))
        {
            changed |= updated.reschedule(checked, &*self.clock);
        }
        if let Some(priority) = request.priority {
            changed |= updated.reprioritize(priority, &*self.clock);
        }
        if let Some(assignee_id) = request.assigned_to.filter(|id| *id != task.assigned_to()) {
            let assignee = self.require_user(assignee_id).await?;
            if let Some(reassigned) = errors.check(updated.reassign(&assignee, &*self.clock)) {
                changed |= reassigned;
            }
            labels = labels.with(&assignee);
            if let Some(previous) = self.users.find_by_id(task.assigned_to()).await? {
                labels = labels.with(&previous);
            }
        }
        errors.into_result()?;

        if let Some(target) = request.status {
            changed |= updated.transition_to(target, &*self.clock)?;
        }

        if !changed {
            return Ok(task);
        }
        self.commit_update(actor, &task, updated, &labels).await
    }

    /// Moves a task to `status`.
    ///
    /// # Errors
    ///
    /// See [`Self::update_task`].
    pub async fn change_status(
        &self,
        actor: &Actor,
        task_id: TaskId,
        status: TaskStatus,
    ) -> TaskServiceResult<Task> {
        self.update_task(actor, task_id, UpdateTaskRequest::new().with_status(status))
            .await
    }

    /// Deletes a task with its comments and history.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::AuthorizationDenied`] for non-admins and
    /// [`TaskServiceError::NotFound`] when the task does not exist.
    pub async fn delete_task(&self, actor: &Actor, task_id: TaskId) -> TaskServiceResult<()> {
        authorize(actor, policy::can_delete_task(actor), "delete_task")?;
        self.tasks.commit(TaskChangeSet::delete(task_id)).await?;
        info!(%task_id, actor_id = %actor.id, action = "deleted", "task deleted");
        Ok(())
    }

    /// Adds a comment to a task the actor can view.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`],
    /// [`TaskServiceError::AuthorizationDenied`], or
    /// [`TaskServiceError::Validation`] for empty or oversized content.
    pub async fn add_comment(
        &self,
        actor: &Actor,
        task_id: TaskId,
        content: impl Into<String> + Send,
    ) -> TaskServiceResult<TaskComment> {
        let task = self.require_task(task_id).await?;
        authorize(actor, policy::can_comment(actor, &task), "add_comment")?;

        let checked = CommentContent::new(content)?;
        let comment = TaskComment::new(task_id, actor.id, checked, &*self.clock);
        self.tasks
            .commit(TaskChangeSet::comment(comment.clone()))
            .await?;

        info!(%task_id, actor_id = %actor.id, comment_id = %comment.id(), "comment added");
        Ok(comment)
    }

    /// Returns a task with its comments, history, and due-date state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] or
    /// [`TaskServiceError::AuthorizationDenied`].
    pub async fn task_detail(&self, actor: &Actor, task_id: TaskId) -> TaskServiceResult<TaskDetail> {
        let task = self.visible_task(actor, task_id, "task_detail").await?;
        let comments = self.tasks.list_comments(task_id).await?;
        let history = newest_first(self.tasks.list_history(task_id).await?);
        let now = self.clock.utc();
        Ok(TaskDetail {
            is_overdue: task.is_overdue(now),
            days_until_due: task.days_until_due(now),
            task,
            comments,
            history,
        })
    }

    /// Returns the comments on a task, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] or
    /// [`TaskServiceError::AuthorizationDenied`].
    pub async fn list_comments(
        &self,
        actor: &Actor,
        task_id: TaskId,
    ) -> TaskServiceResult<Vec<TaskComment>> {
        self.visible_task(actor, task_id, "list_comments").await?;
        Ok(self.tasks.list_comments(task_id).await?)
    }

    /// Returns the history of a task, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] or
    /// [`TaskServiceError::AuthorizationDenied`].
    pub async fn task_history(
        &self,
        actor: &Actor,
        task_id: TaskId,
    ) -> TaskServiceResult<Vec<TaskHistoryEntry>> {
        self.visible_task(actor, task_id, "task_history").await?;
        Ok(newest_first(self.tasks.list_history(task_id).await?))
    }

    async fn commit_update(
        &self,
        actor: &Actor,
        previous: &Task,
        mut updated: Task,
        labels: &UserLabels,
    ) -> TaskServiceResult<Task> {
        let history = audit::record_changes(previous, &updated, actor, labels, &*self.clock);
        let recorded = history.len();
        self.tasks
            .commit(TaskChangeSet::update(previous, &mut updated, history))
            .await?;

        info!(
            task_id = %updated.id(),
            actor_id = %actor.id,
            action = "updated",
            history_entries = recorded,
            status = %updated.status(),
            "task updated"
        );
        Ok(updated)
    }

    async fn visible_task(
        &self,
        actor: &Actor,
        task_id: TaskId,
        operation: &'static str,
    ) -> TaskServiceResult<Task> {
        let task = self.require_task(task_id).await?;
        authorize(actor, policy::can_view(actor, &task), operation)?;
        Ok(task)
    }

    async fn require_task(&self, task_id: TaskId) -> TaskServiceResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or(TaskServiceError::NotFound(MissingEntity::Task(task_id)))
    }

    async fn require_user(&self, user_id: UserId) -> TaskServiceResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(TaskServiceError::NotFound(MissingEntity::User(user_id)))
    }
}

fn newest_first(mut history: Vec<TaskHistoryEntry>) -> Vec<TaskHistoryEntry> {
    history.reverse();
    history
}
