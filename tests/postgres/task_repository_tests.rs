//! `PostgreSQL` integration tests for task commits, cascades and ordering.

use chrono::{Duration, NaiveDate};
use mockable::Clock;
use rstest::rstest;
use taskboard::task::{
    domain::{
        CommentContent, HistoryAction, Task, TaskChangeSet, TaskComment, TaskPriority, TaskStatus,
    },
    ports::{TaskRepository, TaskRepositoryError},
    query::{PageRequest, SearchTerm, TaskFilter, TaskOrdering, TaskQuery, TaskSortField},
};

use crate::postgres::helpers::{BoxError, Store, store};

fn query(filter: TaskFilter, ordering: TaskOrdering) -> TaskQuery {
    TaskQuery::new(filter, ordering, PageRequest::new(1, 25, 100))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_create_round_trips_task_and_history(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let task = ctx
        .stored(ctx.draft("Ship report", TaskPriority::High, Duration::days(3))?)
        .await?;

    let found = ctx.tasks.find_by_id(task.id()).await?;
    let history = ctx.tasks.list_history(task.id()).await?;

    assert_eq!(found, Some(task));
    assert_eq!(history.len(), 1);
    assert_eq!(
        history.first().map(|entry| entry.action()),
        Some(HistoryAction::Created)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_duplicate_history_id_rolls_back_task_insert(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let task = ctx.draft("Ship report", TaskPriority::Medium, Duration::days(3))?;
    let created = ctx.entry(&task, HistoryAction::Created, "Task created");
    let repeated = created.clone();

    let result = ctx
        .tasks
        .commit(TaskChangeSet::create(task.clone(), vec![created.clone(), repeated]))
        .await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateHistoryEntry(id)) if id == created.id()
    ));
    assert_eq!(ctx.tasks.find_by_id(task.id()).await?, None);
    assert_eq!(ctx.tasks.count(&TaskFilter::new()).await?, 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_reused_history_id_rolls_back_task_update(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let task = ctx
        .stored(ctx.draft("Ship report", TaskPriority::Medium, Duration::days(3))?)
        .await?;
    let reused = ctx
        .tasks
        .list_history(task.id())
        .await?
        .into_iter()
        .next()
        .ok_or("creation entry missing")?;
    let mut edited = task.clone();
    edited.reprioritize(TaskPriority::Urgent, &ctx.clock);

    let result = ctx
        .tasks
        .commit(TaskChangeSet::update(&task, &mut edited, vec![reused]))
        .await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::DuplicateHistoryEntry(_))
    ));
    assert_eq!(ctx.tasks.find_by_id(task.id()).await?, Some(task.clone()));
    assert_eq!(ctx.tasks.list_history(task.id()).await?.len(), 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_stale_revision_is_a_conflict(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let task = ctx
        .stored(ctx.draft("Ship report", TaskPriority::Medium, Duration::days(3))?)
        .await?;
    let mut first = task.clone();
    first.reprioritize(TaskPriority::High, &ctx.clock);
    let first_entry = ctx.entry(&task, HistoryAction::Updated, "Priority raised");
    ctx.tasks
        .commit(TaskChangeSet::update(&task, &mut first, vec![first_entry]))
        .await?;

    let mut second = task.clone();
    second.reprioritize(TaskPriority::Low, &ctx.clock);
    let second_entry = ctx.entry(&task, HistoryAction::Updated, "Priority lowered");
    let result = ctx
        .tasks
        .commit(TaskChangeSet::update(&task, &mut second, vec![second_entry]))
        .await;

    assert!(matches!(
        result,
        Err(TaskRepositoryError::Conflict {
            task_id,
            expected: 0,
            actual: 1,
        }) if task_id == task.id()
    ));
    let stored = ctx.tasks.find_by_id(task.id()).await?;
    assert_eq!(stored.as_ref().map(Task::priority), Some(TaskPriority::High));
    assert_eq!(stored.as_ref().map(Task::revision), Some(1));
    assert_eq!(ctx.tasks.list_history(task.id()).await?.len(), 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_update_of_missing_task_is_not_found(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let task = ctx.draft("Never stored", TaskPriority::Low, Duration::days(3))?;
    let mut edited = task.clone();
    edited.reprioritize(TaskPriority::High, &ctx.clock);

    let result = ctx
        .tasks
        .commit(TaskChangeSet::update(&task, &mut edited, Vec::new()))
        .await;

    assert!(matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == task.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_delete_cascades_to_comments_and_history(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let task = ctx
        .stored(ctx.draft("Ship report", TaskPriority::Medium, Duration::days(3))?)
        .await?;
    let comment = TaskComment::new(
        task.id(),
        ctx.alice.id(),
        CommentContent::new("Looks good")?,
        &ctx.clock,
    );
    ctx.tasks.commit(TaskChangeSet::comment(comment)).await?;
    assert_eq!(ctx.tasks.list_comments(task.id()).await?.len(), 1);

    ctx.tasks.commit(TaskChangeSet::delete(task.id())).await?;

    assert_eq!(ctx.tasks.find_by_id(task.id()).await?, None);
    assert!(ctx.tasks.list_comments(task.id()).await?.is_empty());
    assert!(ctx.tasks.list_history(task.id()).await?.is_empty());
    let again = ctx.tasks.commit(TaskChangeSet::delete(task.id())).await;
    assert!(matches!(again, Err(TaskRepositoryError::NotFound(_))));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_comment_on_missing_task_is_not_found(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let task = ctx.draft("Never stored", TaskPriority::Low, Duration::days(3))?;
    let comment = TaskComment::new(
        task.id(),
        ctx.admin.id(),
        CommentContent::new("orphan")?,
        &ctx.clock,
    );

    let result = ctx.tasks.commit(TaskChangeSet::comment(comment)).await;

    assert!(matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == task.id()));
    Ok(())
}

#[rstest]
#[case::ascending(
    TaskOrdering::ascending(TaskSortField::Priority),
    ["low", "medium", "high", "urgent"]
)]
#[case::descending(
    TaskOrdering::descending(TaskSortField::Priority),
    ["urgent", "high", "medium", "low"]
)]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_priority_sorts_by_urgency_rank(
    #[future] store: Result<Store, BoxError>,
    #[case] ordering: TaskOrdering,
    #[case] expected: [&str; 4],
) -> Result<(), BoxError> {
    let ctx = store.await?;
    for priority in [
        TaskPriority::Medium,
        TaskPriority::Urgent,
        TaskPriority::Low,
        TaskPriority::High,
    ] {
        ctx.clock.advance(Duration::minutes(1));
        ctx.stored(ctx.draft(priority.as_str(), priority, Duration::days(3))?)
            .await?;
    }

    let page = ctx.tasks.find_page(&query(TaskFilter::new(), ordering)).await?;

    let titles: Vec<&str> = page.items.iter().map(|task| task.title().as_str()).collect();
    assert_eq!(titles, expected);
    Ok(())
}

#[rstest]
#[case::ascending(
    TaskOrdering::ascending(TaskSortField::Status),
    [TaskStatus::NotStarted, TaskStatus::InProgress, TaskStatus::Completed]
)]
#[case::descending(
    TaskOrdering::descending(TaskSortField::Status),
    [TaskStatus::Completed, TaskStatus::InProgress, TaskStatus::NotStarted]
)]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_status_sorts_by_lifecycle_rank(
    #[future] store: Result<Store, BoxError>,
    #[case] ordering: TaskOrdering,
    #[case] expected: [TaskStatus; 3],
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let walks: [&[TaskStatus]; 3] = [
        &[TaskStatus::InProgress, TaskStatus::Completed],
        &[],
        &[TaskStatus::InProgress],
    ];
    for steps in walks {
        ctx.clock.advance(Duration::minutes(1));
        let mut task = ctx.draft("Status walk", TaskPriority::Medium, Duration::days(3))?;
        for status in steps {
            task.transition_to(*status, &ctx.clock)?;
        }
        ctx.stored(task).await?;
    }

    let page = ctx.tasks.find_page(&query(TaskFilter::new(), ordering)).await?;

    let statuses: Vec<TaskStatus> = page.items.iter().map(Task::status).collect();
    assert_eq!(statuses, expected);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_search_treats_wildcards_literally(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let literal = ctx
        .stored(ctx.draft("Reach 100% coverage", TaskPriority::Medium, Duration::days(3))?)
        .await?;
    ctx.stored(ctx.draft("Reach 1000 users", TaskPriority::Medium, Duration::days(3))?)
        .await?;
    ctx.stored(ctx.draft("rename snake_case", TaskPriority::Medium, Duration::days(3))?)
        .await?;
    ctx.stored(ctx.draft("rename snakeXcase", TaskPriority::Medium, Duration::days(3))?)
        .await?;

    let percent = TaskFilter {
        search: SearchTerm::new("100%"),
        ..TaskFilter::new()
    };
    let underscore = TaskFilter {
        search: SearchTerm::new("SNAKE_"),
        ..TaskFilter::new()
    };
    let ordering = TaskOrdering::ascending(TaskSortField::Title);
    let by_percent = ctx.tasks.find_page(&query(percent, ordering)).await?;
    let by_underscore = ctx.tasks.find_page(&query(underscore, ordering)).await?;

    let ids: Vec<_> = by_percent.items.iter().map(Task::id).collect();
    assert_eq!(ids, vec![literal.id()]);
    let titles: Vec<&str> = by_underscore
        .items
        .iter()
        .map(|task| task.title().as_str())
        .collect();
    assert_eq!(titles, vec!["rename snake_case"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_filters_page_and_count_agree(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    for day in 1..=5 {
        ctx.clock.advance(Duration::minutes(1));
        let mut task = ctx.draft("Daily check", TaskPriority::Medium, Duration::days(day))?;
        if matches!(day, 2 | 4) {
            task.transition_to(TaskStatus::InProgress, &ctx.clock)?;
        }
        ctx.stored(task).await?;
    }
    let filter = TaskFilter {
        status: Some(TaskStatus::NotStarted),
        ..TaskFilter::new().assigned_to(ctx.alice.id())
    };

    let page = ctx
        .tasks
        .find_page(&TaskQuery::new(
            filter.clone(),
            TaskOrdering::ascending(TaskSortField::DueDate),
            PageRequest::new(2, 2, 100),
        ))
        .await?;
    let total = ctx.tasks.count(&filter).await?;

    assert_eq!(total, 3);
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 1);
    assert!(
        page.items
            .iter()
            .all(|task| task.status() == TaskStatus::NotStarted)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn postgres_day_filters_cover_whole_utc_days(
    #[future] store: Result<Store, BoxError>,
) -> Result<(), BoxError> {
    let ctx = store.await?;
    let tomorrow = Duration::days(1);
    for due_in in [
        tomorrow,
        tomorrow + Duration::hours(14) + Duration::minutes(59),
        tomorrow + Duration::hours(15),
    ] {
        ctx.stored(ctx.draft("Day bound", TaskPriority::Medium, due_in)?)
            .await?;
    }
    let today = ctx.clock.utc().date_naive();
    let next_day = (ctx.clock.utc() + tomorrow).date_naive();
    let due_on = |day: NaiveDate| TaskFilter {
        due_on: Some(day),
        ..TaskFilter::new()
    };
    let updated_on = |day: NaiveDate| TaskFilter {
        updated_on: Some(day),
        ..TaskFilter::new()
    };

    assert_eq!(ctx.tasks.count(&due_on(next_day)).await?, 2);
    assert_eq!(ctx.tasks.count(&due_on(today)).await?, 0);
    assert_eq!(ctx.tasks.count(&updated_on(today)).await?, 3);
    assert_eq!(ctx.tasks.count(&updated_on(next_day)).await?, 0);
    Ok(())
}
