//! Timer polling against estimates through the public engine API.

use crate::test_helpers::{Workspace, workspace};
use eyre::ensure;
use rstest::{fixture, rstest};
use taskflow::notification::{domain::NotificationKind, ports::NotificationRepository};
use taskflow::task::{
    domain::{ProjectId, TeamCategory},
    services::{CreateTaskRequest, TaskEdit, TransitionTaskRequest},
};
use taskflow::timer::domain::TimerState;

#[fixture]
fn ws() -> Workspace {
    workspace().expect("seeded workspace")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn warning_at_fifty_minutes_and_one_exceeded_notice_after(
    ws: Workspace,
) -> Result<(), eyre::Report> {
    let developer = ws.staff.developer.as_actor();
    let task = ws
        .engine
        .create_task(
            &ws.staff.manager.as_actor(),
            CreateTaskRequest::new(
                ProjectId::new(),
                TeamCategory::Programming,
                "Report export",
                developer.id,
            )
            .with_estimate(60),
        )
        .await?;
    ws.engine
        .transition_status(&developer, &TransitionTaskRequest::new(task.id(), "IN_PROGRESS"))
        .await?;
    let timers = ws.engine.timers();
    timers.start_timer(task.id(), &developer).await?;

    ws.clock.advance_minutes(50);
    let at_fifty = timers.get_timer_state(task.id()).await?;
    ensure!(at_fifty.state == TimerState::Warning, "state {}", at_fifty.state);

    ws.clock.advance_minutes(11);
    for _ in 0..100 {
        let polled = timers.get_timer_state(task.id()).await?;
        ensure!(polled.state == TimerState::Exceeded, "state {}", polled.state);
    }

    let exceeded: Vec<_> = ws
        .notifications
        .find_by_task(task.id())
        .await?
        .into_iter()
        .filter(|notification| notification.kind() == NotificationKind::TimeExceeded)
        .collect();
    ensure!(exceeded.len() == 3, "one notice each for admin, PM, and lead");
    ensure!(
        exceeded
            .iter()
            .all(|notification| notification.user_id() != ws.staff.other_lead.id()),
        "other team's lead is not notified"
    );

    let minutes = timers.stop_timer(&developer).await?;
    ensure!(minutes == 61, "recorded {minutes} minutes");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn manager_edit_of_estimate_changes_the_threshold(ws: Workspace) -> Result<(), eyre::Report> {
    let developer = ws.staff.developer.as_actor();
    let task = ws
        .engine
        .create_task(
            &ws.staff.manager.as_actor(),
            CreateTaskRequest::new(
                ProjectId::new(),
                TeamCategory::Programming,
                "Search tuning",
                developer.id,
            )
            .with_estimate(30),
        )
        .await?;
    ws.engine
        .transition_status(&developer, &TransitionTaskRequest::new(task.id(), "IN_PROGRESS"))
        .await?;
    let timers = ws.engine.timers();
    timers.start_timer(task.id(), &developer).await?;
    ws.clock.advance_minutes(25);
    ensure!(
        timers.get_timer_state(task.id()).await?.state == TimerState::Warning,
        "25 of 30 minutes should warn"
    );

    ws.engine
        .edit_fields(
            task.id(),
            &ws.staff.lead.as_actor(),
            &TaskEdit {
                estimated_minutes: Some(90),
                ..TaskEdit::default()
            },
        )
        .await?;

    ensure!(
        timers.get_timer_state(task.id()).await?.state == TimerState::Running,
        "25 of 90 minutes should run"
    );
    Ok(())
}
