//! When steps for task workflow BDD scenarios.

use super::world::{WorkflowWorld, run_async};
use rstest_bdd_macros::when;
use taskflow::task::{domain::Actor, services::TransitionTaskRequest};

fn move_task(world: &mut WorkflowWorld, actor: Actor, target: String) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let result = run_async(
        world
            .workspace
            .engine
            .transition_status(&actor, &TransitionTaskRequest::new(task_id, target)),
    );
    world.record(result);
    Ok(())
}

#[when(r#"the QA reviewer moves the task to "{target}""#)]
fn qa_moves_task(world: &mut WorkflowWorld, target: String) -> Result<(), eyre::Report> {
    let actor = world.workspace.staff.qa.as_actor();
    move_task(world, actor, target)
}

#[when(r#"the developer moves the task to "{target}""#)]
fn developer_moves_task(world: &mut WorkflowWorld, target: String) -> Result<(), eyre::Report> {
    let actor = world.workspace.staff.developer.as_actor();
    move_task(world, actor, target)
}

#[when("the manager assigns the second QA reviewer")]
fn manager_assigns_second_qa(world: &mut WorkflowWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let staff = &world.workspace.staff;
    let result = run_async(world.workspace.engine.assign_qa(
        task_id,
        &staff.manager.as_actor(),
        staff.second_qa.id(),
    ));
    world.record(result);
    Ok(())
}
