//! Then steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use rstest_bdd_macros::then;
use taskboard::task::{
    domain::{HistoryAction, TaskHistoryEntry, TaskStatus},
    ports::TaskRepository,
    services::TaskServiceError,
};

fn history(world: &TaskLifecycleWorld) -> Result<Vec<TaskHistoryEntry>, eyre::Report> {
    let task_id = world.task()?.id();
    Ok(run_async(world.tasks.list_history(task_id))?)
}

fn parse_action(action: &str) -> Result<HistoryAction, eyre::Report> {
    HistoryAction::try_from(action)
        .map_err(|err| eyre::eyre!("invalid history action in scenario: {err}"))
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &TaskLifecycleWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let task_id = world.task()?.id();
    let stored = run_async(world.tasks.find_by_id(task_id))?
        .ok_or_else(|| eyre::eyre!("task missing from repository"))?;

    eyre::ensure!(
        stored.status() == expected,
        "expected status {expected}, found {}",
        stored.status()
    );
    Ok(())
}

#[then("the task history has {count:usize} entry")]
fn history_has_one_entry(world: &TaskLifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    history_has_entries(world, count)
}

#[then("the task history has {count:usize} entries")]
fn history_has_entries(world: &TaskLifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let entries = history(world)?;
    eyre::ensure!(
        entries.len() == count,
        "expected {count} history entries, found {}",
        entries.len()
    );
    Ok(())
}

#[then("the change succeeds")]
fn change_succeeds(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    match world.last_result.as_ref() {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => Err(eyre::eyre!("expected success, got {err}")),
        None => Err(eyre::eyre!("no change was attempted")),
    }
}

#[then("the change is refused")]
fn change_is_refused(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no change was attempted"))?;
    eyre::ensure!(
        matches!(result, Err(TaskServiceError::AuthorizationDenied(_))),
        "expected authorization denial, got {result:?}"
    );
    Ok(())
}

#[then("the change fails as an invalid transition")]
fn change_fails_as_invalid_transition(world: &TaskLifecycleWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_result
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no change was attempted"))?;
    eyre::ensure!(
        matches!(result, Err(TaskServiceError::InvalidTransition { .. })),
        "expected an invalid transition, got {result:?}"
    );
    Ok(())
}

#[then(r#"the newest history entry is "{action}" by "{name}""#)]
fn newest_history_entry(
    world: &TaskLifecycleWorld,
    action: String,
    name: String,
) -> Result<(), eyre::Report> {
    let expected = parse_action(&action)?;
    let actor = world.user(&name)?.id();
    let entries = history(world)?;
    let newest = entries
        .last()
        .ok_or_else(|| eyre::eyre!("history is empty"))?;

    eyre::ensure!(newest.action() == expected, "unexpected action {}", newest.action());
    eyre::ensure!(newest.actor() == actor, "entry attributed to the wrong actor");
    Ok(())
}

#[then(r#"the latest history entries are "{first}" then "{second}""#)]
fn latest_history_entries(
    world: &TaskLifecycleWorld,
    first: String,
    second: String,
) -> Result<(), eyre::Report> {
    let expected = [parse_action(&first)?, parse_action(&second)?];
    let entries = history(world)?;
    let latest: Vec<HistoryAction> = entries
        .iter()
        .rev()
        .take(2)
        .rev()
        .map(TaskHistoryEntry::action)
        .collect();

    eyre::ensure!(
        latest == expected,
        "expected {expected:?}, found {latest:?}"
    );
    Ok(())
}

#[then(r#"the task is assigned to "{name}""#)]
fn task_assigned_to(world: &TaskLifecycleWorld, name: String) -> Result<(), eyre::Report> {
    let expected = world.user(&name)?.id();
    eyre::ensure!(
        world.task()?.assigned_to() == expected,
        "task is assigned to someone else"
    );
    Ok(())
}
