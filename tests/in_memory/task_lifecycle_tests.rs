//! In-memory integration tests for task lifecycle operations.

use super::helpers::{Workspace, workspace};
use chrono::Duration;
use rstest::rstest;
use taskboard::task::{
    domain::{HistoryAction, TaskChangeSet, TaskPriority, TaskStatus},
    ports::{TaskRepository, TaskRepositoryError},
    services::{OutcomeKind, TaskServiceError, UpdateTaskRequest},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_walk_records_each_change(#[future] workspace: Workspace) -> eyre::Result<()> {
    let ws = workspace.await;
    let task = ws
        .assign("Ship report", &ws.alice, Duration::days(3), TaskPriority::High)
        .await?;
    let alice = ws.alice.actor();

    for status in [
        TaskStatus::InProgress,
        TaskStatus::NotStarted,
        TaskStatus::Completed,
    ] {
        ws.lifecycle.change_status(&alice, task.id(), status).await?;
    }

    let history = ws.tasks.list_history(task.id()).await?;
    let actions: Vec<HistoryAction> = history.iter().map(|entry| entry.action()).collect();
    eyre::ensure!(
        actions
            == vec![
                HistoryAction::Created,
                HistoryAction::StatusChanged,
                HistoryAction::StatusChanged,
                HistoryAction::StatusChanged,
            ],
        "unexpected history {actions:?}"
    );
    let descriptions: Vec<&str> = history.iter().map(|entry| entry.description()).collect();
    eyre::ensure!(
        descriptions.contains(&"Status changed from not_started to in_progress"),
        "missing status description in {descriptions:?}"
    );
    eyre::ensure!(
        history.iter().skip(1).all(|entry| entry.actor() == ws.alice.id()),
        "status changes should be attributed to the assignee"
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reassigned_task_moves_between_users(#[future] workspace: Workspace) -> eyre::Result<()> {
    let ws = workspace.await;
    let task = ws
        .assign("Ship report", &ws.alice, Duration::days(3), TaskPriority::High)
        .await?;

    ws.lifecycle
        .update_task(
            &ws.admin.actor(),
            task.id(),
            UpdateTaskRequest::new().with_assignee(ws.bob.id()),
        )
        .await?;

    let denied = ws
        .lifecycle
        .change_status(&ws.alice.actor(), task.id(), TaskStatus::InProgress)
        .await;
    eyre::ensure!(
        matches!(denied, Err(TaskServiceError::AuthorizationDenied(_))),
        "former assignee should lose access, got {denied:?}"
    );
    let started = ws
        .lifecycle
        .change_status(&ws.bob.actor(), task.id(), TaskStatus::InProgress)
        .await?;
    eyre::ensure!(started.status() == TaskStatus::InProgress, "bob starts the task");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_change_set_is_a_conflict(#[future] workspace: Workspace) -> eyre::Result<()> {
    let ws = workspace.await;
    let task = ws
        .assign("Ship report", &ws.alice, Duration::days(3), TaskPriority::High)
        .await?;
    let mut stale = task.clone();
    eyre::ensure!(
        stale.reprioritize(TaskPriority::Low, &*ws.clock),
        "priority should change"
    );

    ws.lifecycle
        .change_status(&ws.alice.actor(), task.id(), TaskStatus::InProgress)
        .await?;
    let result = ws
        .tasks
        .commit(TaskChangeSet::update(&task, &mut stale, Vec::new()))
        .await;

    eyre::ensure!(
        matches!(
            result,
            Err(TaskRepositoryError::Conflict {
                expected: 0,
                actual: 1,
                ..
            })
        ),
        "expected a revision conflict, got {result:?}"
    );
    let stored = ws
        .tasks
        .find_by_id(task.id())
        .await?
        .ok_or_else(|| eyre::eyre!("task should still exist"))?;
    eyre::ensure!(stored.priority() == TaskPriority::High, "stale write must not land");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comments_and_history_read_newest_first(#[future] workspace: Workspace) -> eyre::Result<()> {
    let ws = workspace.await;
    let task = ws
        .assign("Ship report", &ws.alice, Duration::days(3), TaskPriority::High)
        .await?;
    ws.lifecycle
        .add_comment(&ws.alice.actor(), task.id(), "Draft attached")
        .await?;
    ws.clock.advance(Duration::minutes(5));
    ws.lifecycle
        .add_comment(&ws.admin.actor(), task.id(), "Looks good")
        .await?;
    ws.lifecycle
        .change_status(&ws.alice.actor(), task.id(), TaskStatus::Completed)
        .await?;

    let detail = ws.lifecycle.task_detail(&ws.alice.actor(), task.id()).await?;

    let contents: Vec<&str> = detail
        .comments
        .iter()
        .map(|comment| comment.content().as_str())
        .collect();
    eyre::ensure!(
        contents == vec!["Looks good", "Draft attached"],
        "unexpected comment order {contents:?}"
    );
    let newest = detail
        .history
        .first()
        .ok_or_else(|| eyre::eyre!("history should not be empty"))?;
    eyre::ensure!(newest.action() == HistoryAction::StatusChanged, "newest entry first");
    eyre::ensure!(!detail.is_overdue, "completed tasks are never overdue");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outsiders_cannot_read_task_detail(#[future] workspace: Workspace) -> eyre::Result<()> {
    let ws = workspace.await;
    let task = ws
        .assign("Ship report", &ws.alice, Duration::days(3), TaskPriority::High)
        .await?;

    let err = ws
        .lifecycle
        .task_detail(&ws.bob.actor(), task.id())
        .await
        .err()
        .ok_or_else(|| eyre::eyre!("bob should be refused"))?;

    eyre::ensure!(
        err.outcome() == OutcomeKind::AuthorizationDenied,
        "unexpected outcome {:?}",
        err.outcome()
    );
    Ok(())
}
