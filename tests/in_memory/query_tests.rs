//! In-memory integration tests for task listings and dashboards.

use super::helpers::{Workspace, workspace};
use chrono::Duration;
use rstest::rstest;
use taskboard::task::{
    domain::{TaskPriority, TaskStatus},
    query::TaskListParams,
    services::{Dashboard, TaskListItem},
};

fn titles(items: &[TaskListItem]) -> Vec<&str> {
    items.iter().map(|item| item.task.title().as_str()).collect()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filters_combine(#[future] workspace: Workspace) -> eyre::Result<()> {
    let ws = workspace.await;
    ws.assign("Quarterly report", &ws.alice, Duration::days(2), TaskPriority::High)
        .await?;
    ws.assign("Weekly report", &ws.alice, Duration::days(2), TaskPriority::Low)
        .await?;
    ws.assign("Quarterly budget", &ws.bob, Duration::days(2), TaskPriority::High)
        .await?;

    let params = TaskListParams::new()
        .priority("high")
        .search("REPORT")
        .status("not_started");
    let page = ws.queries.list_tasks(&ws.admin.actor(), &params).await?;

    eyre::ensure!(
        titles(&page.items) == vec!["Quarterly report"],
        "unexpected matches {:?}",
        titles(&page.items)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overdue_filter_and_flags(#[future] workspace: Workspace) -> eyre::Result<()> {
    let ws = workspace.await;
    ws.assign("Soon", &ws.alice, Duration::hours(2), TaskPriority::Medium)
        .await?;
    ws.assign("Later", &ws.alice, Duration::days(10), TaskPriority::Medium)
        .await?;
    ws.clock.advance(Duration::hours(3));

    let page = ws
        .queries
        .list_tasks(&ws.alice.actor(), &TaskListParams::new().overdue("true"))
        .await?;

    let [item] = page.items.as_slice() else {
        return Err(eyre::eyre!("expected one overdue task, got {}", page.items.len()));
    };
    eyre::ensure!(item.task.title().as_str() == "Soon", "wrong overdue task");
    eyre::ensure!(item.is_overdue, "item should be flagged overdue");
    eyre::ensure!(item.days_until_due == Some(-1), "overdue by part of a day floors to -1");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn due_date_window_sorted_ascending(#[future] workspace: Workspace) -> eyre::Result<()> {
    let ws = workspace.await;
    for (title, days) in [("Day five", 5), ("Day one", 1), ("Day three", 3), ("Day nine", 9)] {
        ws.assign(title, &ws.alice, Duration::days(days), TaskPriority::Medium)
            .await?;
    }

    let params = TaskListParams::new()
        .due_date_from("2026-03-03")
        .due_date_to("2026-03-07")
        .sort_by("due_date");
    let page = ws.queries.list_tasks(&ws.alice.actor(), &params).await?;

    eyre::ensure!(
        titles(&page.items) == vec!["Day one", "Day three", "Day five"],
        "unexpected window {:?}",
        titles(&page.items)
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn second_page_continues_the_first(#[future] workspace: Workspace) -> eyre::Result<()> {
    let ws = workspace.await;
    for n in 0..5 {
        ws.assign(&format!("Task {n}"), &ws.alice, Duration::days(1), TaskPriority::Medium)
            .await?;
    }

    let params = TaskListParams::new().sort_by("title").page_size("3");
    let first = ws.queries.list_tasks(&ws.alice.actor(), &params).await?;
    let second = ws
        .queries
        .list_tasks(&ws.alice.actor(), &params.clone().page("2"))
        .await?;

    eyre::ensure!(titles(&first.items) == vec!["Task 0", "Task 1", "Task 2"], "first page");
    eyre::ensure!(titles(&second.items) == vec!["Task 3", "Task 4"], "second page");
    eyre::ensure!(!second.has_next(), "no third page");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn member_dashboard_reflects_completion(#[future] workspace: Workspace) -> eyre::Result<()> {
    let ws = workspace.await;
    let task = ws
        .assign("Ship report", &ws.alice, Duration::days(3), TaskPriority::High)
        .await?;
    ws.lifecycle
        .change_status(&ws.alice.actor(), task.id(), TaskStatus::Completed)
        .await?;

    let Dashboard::Member(member) = ws.queries.dashboard(&ws.alice.actor()).await? else {
        return Err(eyre::eyre!("expected a member dashboard"));
    };

    eyre::ensure!(member.upcoming.is_empty(), "completed tasks are not upcoming");
    eyre::ensure!(
        member.recently_completed.iter().map(|t| t.id()).eq([task.id()]),
        "completed task listed"
    );
    Ok(())
}
