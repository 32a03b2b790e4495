//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{
        CommentRow, HistoryRow, NewCommentRow, NewHistoryRow, NewTaskRow, TaskChangesRow, TaskRow,
    },
    schema::{task_comments, task_history, tasks},
};
use crate::postgres::{PgPool, run_blocking};
use crate::task::{
    domain::{
        CommentContent, CommentId, HistoryAction, HistoryEntryId, PersistedHistoryData,
        PersistedTaskData, Task, TaskChangeSet, TaskComment, TaskDescription, TaskHistoryEntry,
        TaskId, TaskPriority, TaskStatus, TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
    query::{Page, SortDirection, TaskFilter, TaskOrdering, TaskQuery, TaskSortField},
};
use crate::user::domain::UserId;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use diesel::dsl::sql;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::Integer;
use tracing::debug;

type BoxedTaskQuery = tasks::BoxedQuery<'static, Pg>;

/// `PostgreSQL`-backed task repository.
///
/// Change sets are applied inside a single transaction. Updates are guarded
/// by the stored revision, and comment and history rows cascade with their
/// task.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(
            &self.pool,
            f,
            TaskRepositoryError::persistence,
            TaskRepositoryError::persistence,
        )
        .await
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn find_page(&self, query: &TaskQuery) -> TaskRepositoryResult<Page<Task>> {
        let lookup = query.clone();
        self.run(move |connection| {
            let total: i64 = filtered(&lookup.filter).count().get_result(connection)?;
            let limit = i64::from(lookup.page.page_size());
            let offset =
                i64::try_from(lookup.page.offset()).map_err(TaskRepositoryError::persistence)?;
            let rows = ordered(filtered(&lookup.filter), lookup.ordering)
                .limit(limit)
                .offset(offset)
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            let items = rows
                .into_iter()
                .map(row_to_task)
                .collect::<TaskRepositoryResult<Vec<_>>>()?;
            Ok(Page::new(items, to_count(total)?, lookup.page))
        })
        .await
    }

    async fn count(&self, filter: &TaskFilter) -> TaskRepositoryResult<u64> {
        let lookup = filter.clone();
        self.run(move |connection| {
            let total: i64 = filtered(&lookup).count().get_result(connection)?;
            to_count(total)
        })
        .await
    }

    async fn list_comments(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskComment>> {
        self.run(move |connection| {
            let rows = task_comments::table
                .filter(task_comments::task_id.eq(task_id.into_inner()))
                .order_by((task_comments::created_at.desc(), task_comments::id.desc()))
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)?;
            rows.into_iter().map(row_to_comment).collect()
        })
        .await
    }

    async fn list_history(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<TaskHistoryEntry>> {
        self.run(move |connection| {
            let rows = task_history::table
                .filter(task_history::task_id.eq(task_id.into_inner()))
                .order_by(task_history::sequence.asc())
                .select(HistoryRow::as_select())
                .load::<HistoryRow>(connection)?;
            rows.into_iter().map(row_to_history).collect()
        })
        .await
    }

    async fn commit(&self, change: TaskChangeSet) -> TaskRepositoryResult<()> {
        let task_id = change.task_id();
        let history_entries = change.history().len();
        self.run(move |connection| {
            connection.transaction(|transaction| apply_change(transaction, change))
        })
        .await?;
        debug!(%task_id, history_entries, "task change set committed");
        Ok(())
    }
}

fn apply_change(connection: &mut PgConnection, change: TaskChangeSet) -> TaskRepositoryResult<()> {
    match change {
        TaskChangeSet::Create { task, history } => {
            let task_id = task.id();
            diesel::insert_into(tasks::table)
                .values(&to_new_row(&task)?)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        TaskRepositoryError::DuplicateTask(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            insert_history(connection, &history)
        }
        TaskChangeSet::Update {
            task,
            expected_revision,
            history,
        } => {
            let task_id = task.id();
            let expected = to_revision(expected_revision)?;
            let updated = diesel::update(
                tasks::table
                    .filter(tasks::id.eq(task_id.into_inner()))
                    .filter(tasks::revision.eq(expected)),
            )
            .set(&to_changes_row(&task)?)
            .execute(connection)?;
            if updated == 0 {
                return Err(stale_write(connection, task_id, expected_revision)?);
            }
            insert_history(connection, &history)
        }
        TaskChangeSet::Delete { task_id } => {
            let deleted = diesel::delete(tasks::table.filter(tasks::id.eq(task_id.into_inner())))
                .execute(connection)?;
            if deleted == 0 {
                return Err(TaskRepositoryError::NotFound(task_id));
            }
            Ok(())
        }
        TaskChangeSet::Comment { comment } => {
            let task_id = comment.task_id();
            let row = NewCommentRow {
                id: comment.id().into_inner(),
                task_id: task_id.into_inner(),
                author_id: comment.author().into_inner(),
                content: comment.content().as_str().to_owned(),
                created_at: comment.created_at(),
            };
            diesel::insert_into(task_comments::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, ref info)
                        if info
                            .constraint_name()
                            .is_some_and(|name| name == "task_comments_task_id_fkey") =>
                    {
                        TaskRepositoryError::NotFound(task_id)
                    }
                    _ => TaskRepositoryError::persistence(err),
                })?;
            Ok(())
        }
    }
}

fn insert_history(
    connection: &mut PgConnection,
    entries: &[TaskHistoryEntry],
) -> TaskRepositoryResult<()> {
    for entry in entries {
        let row = NewHistoryRow {
            id: entry.id().into_inner(),
            task_id: entry.task_id().into_inner(),
            actor_id: entry.actor().into_inner(),
            action: entry.action().as_str().to_owned(),
            description: entry.description().to_owned(),
            recorded_at: entry.recorded_at(),
        };
        diesel::insert_into(task_history::table)
            .values(&row)
            .execute(connection)
            .map_err(|err| match err {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    TaskRepositoryError::DuplicateHistoryEntry(entry.id())
                }
                _ => TaskRepositoryError::persistence(err),
            })?;
    }
    Ok(())
}

/// Explains why a revision-guarded update touched no rows.
fn stale_write(
    connection: &mut PgConnection,
    task_id: TaskId,
    expected: u64,
) -> TaskRepositoryResult<TaskRepositoryError> {
    let stored: Option<i64> = tasks::table
        .filter(tasks::id.eq(task_id.into_inner()))
        .select(tasks::revision)
        .first(connection)
        .optional()?;
    Ok(match stored {
        None => TaskRepositoryError::NotFound(task_id),
        Some(actual) => TaskRepositoryError::Conflict {
            task_id,
            expected,
            actual: from_revision(actual)?,
        },
    })
}

fn filtered(filter: &TaskFilter) -> BoxedTaskQuery {
    let mut query = tasks::table.into_boxed();
    if let Some(assignee) = filter.assignee {
        query = query.filter(tasks::assigned_to.eq(assignee.into_inner()));
    }
    if let Some(status) = filter.status {
        query = query.filter(tasks::status.eq(status.as_str()));
    }
    if filter.open_only {
        query = query.filter(tasks::status.ne(TaskStatus::Completed.as_str()));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(tasks::priority.eq(priority.as_str()));
    }
    if let Some(day) = filter.due_on {
        let (start, end) = day_bounds(day);
        query = query.filter(tasks::due_date.ge(start).and(tasks::due_date.lt(end)));
    }
    if let Some(from) = filter.due_from {
        query = query.filter(tasks::due_date.ge(from));
    }
    if let Some(until) = filter.due_until {
        query = query.filter(tasks::due_date.le(until));
    }
    if let Some(now) = filter.overdue_as_of {
        query = query.filter(
            tasks::status
                .ne(TaskStatus::Completed.as_str())
                .and(tasks::due_date.lt(now)),
        );
    }
    if let Some(day) = filter.updated_on {
        let (start, end) = day_bounds(day);
        query = query.filter(tasks::updated_at.ge(start).and(tasks::updated_at.lt(end)));
    }
    if let Some(term) = &filter.search {
        let pattern = format!("%{}%", escape_like(term.as_str()));
        query = query.filter(
            tasks::title
                .ilike(pattern.clone())
                .or(tasks::description.ilike(pattern)),
        );
    }
    query
}

fn ordered(query: BoxedTaskQuery, ordering: TaskOrdering) -> BoxedTaskQuery {
    let descending = ordering.direction() == SortDirection::Descending;
    let primary = match ordering.field() {
        TaskSortField::Title if descending => query.order_by(tasks::title.desc()),
        TaskSortField::Title => query.order_by(tasks::title.asc()),
        TaskSortField::DueDate if descending => query.order_by(tasks::due_date.desc()),
        TaskSortField::DueDate => query.order_by(tasks::due_date.asc()),
        TaskSortField::CreatedAt if descending => query.order_by(tasks::created_at.desc()),
        TaskSortField::CreatedAt => query.order_by(tasks::created_at.asc()),
        TaskSortField::UpdatedAt if descending => query.order_by(tasks::updated_at.desc()),
        TaskSortField::UpdatedAt => query.order_by(tasks::updated_at.asc()),
        TaskSortField::Status => {
            let rank = sql::<Integer>(&rank_case(
                "tasks.status",
                TaskStatus::ALL.map(|status| (status.as_str(), status.rank())),
            ));
            if descending {
                query.order_by(rank.desc())
            } else {
                query.order_by(rank.asc())
            }
        }
        TaskSortField::Priority => {
            let rank = sql::<Integer>(&rank_case(
                "tasks.priority",
                TaskPriority::ALL.map(|priority| (priority.as_str(), priority.rank())),
            ));
            if descending {
                query.order_by(rank.desc())
            } else {
                query.order_by(rank.asc())
            }
        }
    };
    primary
        .then_order_by(tasks::created_at.desc())
        .then_order_by(tasks::id.asc())
}

/// Builds a `CASE` expression mapping storage strings to their rank.
fn rank_case<const N: usize>(column: &str, ranks: [(&str, u8); N]) -> String {
    let arms: String = ranks
        .iter()
        .map(|(value, rank)| format!(" WHEN '{value}' THEN {rank}"))
        .collect();
    format!("CASE {column}{arms} END")
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for character in term.chars() {
        if matches!(character, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(character);
    }
    escaped
}

fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = day.and_time(NaiveTime::MIN).and_utc();
    (start, start + TimeDelta::days(1))
}

fn to_count(value: i64) -> TaskRepositoryResult<u64> {
    u64::try_from(value).map_err(TaskRepositoryError::persistence)
}

fn to_revision(value: u64) -> TaskRepositoryResult<i64> {
    i64::try_from(value).map_err(TaskRepositoryError::persistence)
}

fn from_revision(value: i64) -> TaskRepositoryResult<u64> {
    u64::try_from(value).map_err(TaskRepositoryError::persistence)
}

fn to_new_row(task: &Task) -> TaskRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().as_str().to_owned(),
        description: task.description().as_str().to_owned(),
        due_date: task.due_date(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        assigned_to: task.assigned_to().into_inner(),
        created_by: task.created_by().into_inner(),
        revision: to_revision(task.revision())?,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    })
}

fn to_changes_row(task: &Task) -> TaskRepositoryResult<TaskChangesRow> {
    Ok(TaskChangesRow {
        title: task.title().as_str().to_owned(),
        description: task.description().as_str().to_owned(),
        due_date: task.due_date(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        assigned_to: task.assigned_to().into_inner(),
        revision: to_revision(task.revision())?,
        updated_at: task.updated_at(),
    })
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title: persisted_title,
        description: persisted_description,
        due_date,
        status: persisted_status,
        priority: persisted_priority,
        assigned_to,
        created_by,
        revision: persisted_revision,
        created_at,
        updated_at,
    } = row;

    let title = TaskTitle::new(persisted_title).map_err(TaskRepositoryError::persistence)?;
    let description =
        TaskDescription::new(persisted_description).map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let priority = TaskPriority::try_from(persisted_priority.as_str())
        .map_err(TaskRepositoryError::persistence)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(id),
        title,
        description,
        due_date,
        status,
        priority,
        assigned_to: UserId::from_uuid(assigned_to),
        created_by: UserId::from_uuid(created_by),
        revision: from_revision(persisted_revision)?,
        created_at,
        updated_at,
    }))
}

fn row_to_comment(row: CommentRow) -> TaskRepositoryResult<TaskComment> {
    let content = CommentContent::new(row.content).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskComment::from_persisted(
        CommentId::from_uuid(row.id),
        TaskId::from_uuid(row.task_id),
        UserId::from_uuid(row.author_id),
        content,
        row.created_at,
    ))
}

fn row_to_history(row: HistoryRow) -> TaskRepositoryResult<TaskHistoryEntry> {
    let action =
        HistoryAction::try_from(row.action.as_str()).map_err(TaskRepositoryError::persistence)?;
    Ok(TaskHistoryEntry::from_persisted(PersistedHistoryData {
        id: HistoryEntryId::from_uuid(row.id),
        task_id: TaskId::from_uuid(row.task_id),
        actor: UserId::from_uuid(row.actor_id),
        action,
        description: row.description,
        recorded_at: row.recorded_at,
    }))
}
