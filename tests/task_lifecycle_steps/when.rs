//! When steps for task lifecycle BDD scenarios.

use super::world::{TaskLifecycleWorld, run_async};
use rstest_bdd_macros::when;
use taskboard::task::{domain::TaskStatus, services::UpdateTaskRequest};

#[when(r#""{name}" changes the task status to "{status}""#)]
fn change_status(
    world: &mut TaskLifecycleWorld,
    name: String,
    status: String,
) -> Result<(), eyre::Report> {
    let target = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let actor = world.user(&name)?.actor();
    let task_id = world.task()?.id();

    let result = run_async(world.service.change_status(&actor, task_id, target));
    world.record(result);
    Ok(())
}

#[when(r#""{name}" reassigns the task to "{assignee}" with status "{status}""#)]
fn reassign_with_status(
    world: &mut TaskLifecycleWorld,
    name: String,
    assignee: String,
    status: String,
) -> Result<(), eyre::Report> {
    let target = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))?;
    let actor = world.user(&name)?.actor();
    let request = UpdateTaskRequest::new()
        .with_assignee(world.user(&assignee)?.id())
        .with_status(target);
    let task_id = world.task()?.id();

    let result = run_async(world.service.update_task(&actor, task_id, request));
    world.record(result);
    Ok(())
}
