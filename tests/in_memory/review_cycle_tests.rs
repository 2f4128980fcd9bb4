//! End-to-end QA review cycles through the public engine API.

use crate::test_helpers::{Workspace, workspace};
use eyre::{WrapErr, ensure};
use rstest::{fixture, rstest};
use taskflow::error::{BoundaryError, ErrorKind};
use taskflow::notification::{domain::NotificationKind, ports::NotificationRepository};
use taskflow::task::{
    domain::{NoteBody, ProjectId, TaskId, TaskStatus, TeamCategory, UserId},
    services::{CreateTaskRequest, TransitionTaskRequest},
};

#[fixture]
fn ws() -> Workspace {
    workspace().expect("seeded workspace")
}

async fn recipients(
    ws: &Workspace,
    task_id: TaskId,
    kind: NotificationKind,
) -> Result<Vec<UserId>, eyre::Report> {
    let mut users: Vec<UserId> = ws
        .notifications
        .find_by_task(task_id)
        .await?
        .iter()
        .filter(|notification| notification.kind() == kind)
        .map(taskflow::notification::domain::Notification::user_id)
        .collect();
    users.sort();
    Ok(users)
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rework_then_approval_cycle(ws: Workspace) -> Result<(), eyre::Report> {
    let staff = ws.staff.clone();
    let engine = &ws.engine;
    let developer = staff.developer.as_actor();
    let manager = staff.manager.as_actor();

    let task = engine
        .create_task(
            &manager,
            CreateTaskRequest::new(
                ProjectId::new(),
                TeamCategory::Programming,
                "Batch importer",
                developer.id,
            )
            .with_estimate(120)
            .with_attachment("specs/importer.pdf"),
        )
        .await
        .wrap_err("create task")?;
    engine
        .transition_status(&developer, &TransitionTaskRequest::new(task.id(), "IN_PROGRESS"))
        .await
        .wrap_err("start work")?;
    engine
        .transition_status(
            &developer,
            &TransitionTaskRequest::new(task.id(), "WAITING_FOR_QA"),
        )
        .await
        .wrap_err("submit")?;

    engine
        .assign_qa(task.id(), &manager, staff.qa.id())
        .await
        .wrap_err("assign QA")?;
    let duplicate = engine
        .assign_qa(task.id(), &staff.admin.as_actor(), staff.second_qa.id())
        .await;
    let Err(duplicate_error) = duplicate else {
        return Err(eyre::eyre!("second QA assignment should fail"));
    };
    let boundary = BoundaryError::from_error(&duplicate_error);
    ensure!(boundary.kind == ErrorKind::AlreadyAssigned, "kind {:?}", boundary.kind);
    ensure!(!boundary.retryable, "already assigned is not retryable");
    let current = engine.find_task(task.id()).await?;
    ensure!(current.qa_assigned_to() == Some(staff.qa.id()), "QA changed");

    let reworked = engine
        .transition_status(
            &staff.qa.as_actor(),
            &TransitionTaskRequest::new(task.id(), "REWORK").with_note(NoteBody::Rejection {
                reason: "CSV header row is imported as data".to_owned(),
            }),
        )
        .await
        .wrap_err("rework")?;
    ensure!(reworked.rework_count() == 1, "rework count");
    ensure!(reworked.qa_assignment().is_none(), "QA pair cleared");
    let mut expected = vec![
        staff.admin.id(),
        staff.manager.id(),
        staff.lead.id(),
        staff.other_lead.id(),
        staff.developer.id(),
    ];
    expected.sort();
    ensure!(
        recipients(&ws, task.id(), NotificationKind::TaskRework).await? == expected,
        "rework recipients"
    );

    engine
        .transition_status(
            &developer,
            &TransitionTaskRequest::new(task.id(), "WAITING_FOR_QA"),
        )
        .await
        .wrap_err("resubmit")?;
    ensure!(
        recipients(&ws, task.id(), NotificationKind::TaskResubmitted)
            .await?
            .contains(&staff.qa.id()),
        "previous reviewer told about resubmission"
    );
    engine
        .assign_qa(task.id(), &manager, staff.second_qa.id())
        .await
        .wrap_err("assign QA for second cycle")?;

    let approved = engine
        .transition_status(
            &staff.second_qa.as_actor(),
            &TransitionTaskRequest::new(task.id(), "APPROVED").with_note(NoteBody::Approval {
                remark: None,
            }),
        )
        .await
        .wrap_err("approve")?;
    ensure!(approved.status() == TaskStatus::Approved, "approved");
    ensure!(approved.rework_count() == 1, "approval keeps rework count");
    ensure!(approved.completed_at().is_some(), "completion recorded");
    ensure!(approved.notes().len() == 2, "both review notes kept");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn forbidden_errors_cross_the_boundary_with_a_stable_kind(
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
                "Rate limiter",
                developer.id,
            ),
        )
        .await?;

    let Err(error) = ws
        .engine
        .transition_status(&developer, &TransitionTaskRequest::new(task.id(), "APPROVED"))
        .await
    else {
        return Err(eyre::eyre!("developer approval should be forbidden"));
    };

    let boundary = BoundaryError::from_error(&error);
    ensure!(boundary.kind.as_str() == "forbidden", "kind {}", boundary.kind);
    ensure!(!boundary.message.is_empty(), "message present");
    Ok(())
}
