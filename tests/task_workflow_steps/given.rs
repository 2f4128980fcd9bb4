//! Given steps for task workflow BDD scenarios.

use super::world::{WorkflowWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskflow::task::{
    domain::{ProjectId, TeamCategory},
    services::{CreateTaskRequest, TransitionTaskRequest},
};

#[given("a programming task assigned to the developer")]
fn programming_task(world: &mut WorkflowWorld) -> Result<(), eyre::Report> {
    let staff = &world.workspace.staff;
    let request = CreateTaskRequest::new(
        ProjectId::new(),
        TeamCategory::Programming,
        "Invoice PDF renderer",
        staff.developer.id(),
    )
    .with_estimate(45);
    let created = run_async(
        world
            .workspace
            .engine
            .create_task(&staff.manager.as_actor(), request),
    )
    .wrap_err("create task for scenario")?;
    world.task = Some(created);
    Ok(())
}

#[given("the developer has submitted the task for QA")]
fn submitted_for_qa(world: &mut WorkflowWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let developer = world.workspace.staff.developer.as_actor();
    let engine = &world.workspace.engine;
    run_async(engine.transition_status(
        &developer,
        &TransitionTaskRequest::new(task_id, "IN_PROGRESS"),
    ))
    .wrap_err("start work in scenario setup")?;
    let submitted = run_async(engine.transition_status(
        &developer,
        &TransitionTaskRequest::new(task_id, "WAITING_FOR_QA"),
    ))
    .wrap_err("submit for QA in scenario setup")?;
    world.task = Some(submitted);
    Ok(())
}

#[given("the QA reviewer has been assigned")]
fn qa_assigned(world: &mut WorkflowWorld) -> Result<(), eyre::Report> {
    let task_id = world.task()?.id();
    let staff = &world.workspace.staff;
    let assigned = run_async(world.workspace.engine.assign_qa(
        task_id,
        &staff.manager.as_actor(),
        staff.qa.id(),
    ))
    .wrap_err("assign QA in scenario setup")?;
    world.task = Some(assigned);
    Ok(())
}
