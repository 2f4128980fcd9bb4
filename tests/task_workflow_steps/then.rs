//! Then steps for task workflow BDD scenarios.

use super::world::{WorkflowWorld, run_async};
use rstest_bdd_macros::then;
use taskflow::error::ClassifiedError;
use taskflow::notification::{domain::NotificationKind, ports::NotificationRepository};
use taskflow::task::domain::{Task, TaskStatus};

fn stored_task(world: &WorkflowWorld) -> Result<Task, eyre::Report> {
    let task_id = world.task()?.id();
    Ok(run_async(world.workspace.engine.find_task(task_id))?)
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &WorkflowWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = stored_task(world)?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {expected}, found {}",
            task.status()
        ));
    }
    Ok(())
}

#[then("the rework count is {count:u64}")]
fn rework_count_is(world: &WorkflowWorld, count: u64) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    if u64::from(task.rework_count()) != count {
        return Err(eyre::eyre!(
            "expected rework count {count}, found {}",
            task.rework_count()
        ));
    }
    Ok(())
}

#[then("the task has no QA reviewer")]
fn task_has_no_qa_reviewer(world: &WorkflowWorld) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    if task.qa_assignment().is_some() {
        return Err(eyre::eyre!("expected QA assignment to be cleared"));
    }
    Ok(())
}

#[then("the original QA reviewer is still assigned")]
fn original_qa_still_assigned(world: &WorkflowWorld) -> Result<(), eyre::Report> {
    let task = stored_task(world)?;
    let expected = world.workspace.staff.qa.id();
    if task.qa_assigned_to() != Some(expected) {
        return Err(eyre::eyre!(
            "expected QA {expected}, found {:?}",
            task.qa_assigned_to()
        ));
    }
    Ok(())
}

#[then(r#"{count:u64} users received a "{kind}" notification"#)]
fn users_received_notification(
    world: &WorkflowWorld,
    count: u64,
    kind: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let rows = run_async(world.workspace.notifications.find_by_task(task_id))?;
    let mut recipients: Vec<_> = rows
        .iter()
        .filter(|notification| notification.kind().as_str() == kind)
        .map(taskflow::notification::domain::Notification::user_id)
        .collect();
    recipients.sort();
    recipients.dedup();
    let matching = u64::try_from(recipients.len())?;
    if matching != count {
        return Err(eyre::eyre!(
            "expected {count} {kind} recipients, found {matching}"
        ));
    }
    if kind == NotificationKind::TaskRework.as_str()
        && !recipients.contains(&world.workspace.staff.developer.id())
    {
        return Err(eyre::eyre!("assignee missing from rework notifications"));
    }
    Ok(())
}

#[then(r#"the request fails with "{kind}""#)]
fn request_fails_with(world: &WorkflowWorld, kind: String) -> Result<(), eyre::Report> {
    let error = world
        .last_error
        .as_ref()
        .ok_or_else(|| eyre::eyre!("expected the last request to fail"))?;
    if error.kind().as_str() != kind {
        return Err(eyre::eyre!("expected {kind} error, got {error:?}"));
    }
    Ok(())
}
