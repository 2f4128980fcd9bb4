//! Workflow engine: task creation, status transitions, QA assignment, and
//! field edits, with their timer and notification side effects.

use mockable::Clock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::{CreateTaskRequest, TaskEdit, TransitionTaskRequest, WorkflowError, WorkflowResult};
use crate::config::EngineConfig;
use crate::notification::{
    domain::NotificationEvent, ports::NotificationRepository, services::NotificationDispatcher,
};
use crate::storage::{StorageError, bounded};
use crate::task::{
    domain::{
        Actor, AttachmentRef, EstimatedMinutes, FIELD_EDIT_GUARD, NewTask, QA_ASSIGNMENT_GUARD,
        Task, TaskDomainError, TaskFieldChanges, TaskId, TaskStatus, TeamCategory,
        TransitionOutcome, UserId, UserProfile, authorize_transition,
    },
    ports::{TaskRepository, UserDirectory},
};
use crate::timer::{ports::TimerRepository, services::TimerTracker};

/// Orchestrates the task state machine.
///
/// Every mutation is a read, validate, compare-and-swap cycle against the
/// task's version. A lost race is retried from a fresh read up to the
/// configured limit. Side effects run only after the task is committed and
/// their failures are logged, never returned.
pub struct WorkflowEngine<T, M, N, U, C>
where
    T: TaskRepository,
    M: TimerRepository,
    N: NotificationRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    users: Arc<U>,
    timers: Arc<TimerTracker<T, M, N, U, C>>,
    dispatcher: Arc<NotificationDispatcher<N, U, C>>,
    clock: Arc<C>,
    timeout: Duration,
    max_conflict_retries: u8,
}

impl<T, M, N, U, C> WorkflowEngine<T, M, N, U, C>
where
    T: TaskRepository,
    M: TimerRepository,
    N: NotificationRepository + 'static,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Wires the engine, timer tracker, and dispatcher over shared
    /// repositories.
    #[must_use]
    pub fn new(
        tasks: Arc<T>,
        users: Arc<U>,
        timers: Arc<M>,
        notifications: Arc<N>,
        clock: Arc<C>,
        config: &EngineConfig,
    ) -> Self {
        let dispatcher = Arc::new(NotificationDispatcher::new(
            notifications,
            Arc::clone(&users),
            Arc::clone(&clock),
            config,
        ));
        let tracker = Arc::new(TimerTracker::new(
            Arc::clone(&tasks),
            timers,
            Arc::clone(&dispatcher),
            Arc::clone(&clock),
            config,
        ));
        Self {
            tasks,
            users,
            timers: tracker,
            dispatcher,
            clock,
            timeout: config.storage_timeout(),
            max_conflict_retries: config.max_conflict_retries,
        }
    }

    /// Returns the timer tracker sharing this engine's repositories.
    #[must_use]
    pub fn timers(&self) -> &TimerTracker<T, M, N, U, C> {
        &self.timers
    }

    /// Returns the notification dispatcher sharing this engine's
    /// repositories.
    #[must_use]
    pub fn notifications(&self) -> &NotificationDispatcher<N, U, C> {
        &self.dispatcher
    }

    /// Creates a task in `PENDING` and notifies the assignee.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Forbidden`] unless the actor is a manager,
    /// [`WorkflowError::MissingField`] for an absent title, team, or
    /// assignee, [`WorkflowError::InvalidAssignee`] when the assignee is not
    /// a worker in the task's team, [`WorkflowError::InvalidQa`] when the
    /// pre-assigned reviewer is not a QA user, and
    /// [`WorkflowError::Validation`] for malformed values.
    pub async fn create_task(
        &self,
        actor: &Actor,
        request: CreateTaskRequest,
    ) -> WorkflowResult<Task> {
        if !FIELD_EDIT_GUARD.permits(actor, actor.id) {
            return Err(forbidden(actor, None, "create tasks"));
        }
        let title = request
            .title
            .filter(|title| !title.trim().is_empty())
            .ok_or(WorkflowError::MissingField("title"))?;
        let team = request.team.ok_or(WorkflowError::MissingField("team"))?;
        let assignee = request
            .assigned_to
            .ok_or(WorkflowError::MissingField("assigned_to"))?;
        if !self.is_eligible_assignee(assignee, team).await? {
            return Err(WorkflowError::InvalidAssignee(assignee));
        }
        if let Some(reviewer) = request.qa_reviewer {
            if !self.is_qa_user(reviewer).await? {
                return Err(WorkflowError::InvalidQa(reviewer));
            }
        }

        let task = Task::new(
            NewTask {
                project_id: request.project_id,
                team,
                priority: request.priority,
                title,
                description: request.description,
                assigned_to: assignee,
                assigned_by: actor.id,
                qa_reviewer: request.qa_reviewer,
                estimated_minutes: request
                    .estimated_minutes
                    .map(EstimatedMinutes::new)
                    .transpose()?,
                attachments: parse_attachments(request.attachments)?,
            },
            &*self.clock,
        )?;
        bounded(self.timeout, self.tasks.store(&task)).await?;
        tracing::info!(
            task_id = %task.id(),
            team = %team,
            assignee = %assignee,
            created_by = %actor.id,
            "task created"
        );

        self.dispatch(NotificationEvent::TaskAssigned { assignee }, &task)
            .await;
        Ok(task)
    }

    /// Moves a task to the requested status.
    ///
    /// Checks run in a fixed order: the task must exist, the target must
    /// name a status, the actor must hold the role the table requires, and
    /// only then is the edge itself checked.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`], [`WorkflowError::Forbidden`],
    /// [`WorkflowError::InvalidTransition`], or a storage error once
    /// conflict retries are exhausted.
    pub async fn transition_status(
        &self,
        actor: &Actor,
        request: &TransitionTaskRequest,
    ) -> WorkflowResult<Task> {
        let (task, outcome) = self
            .retry_on_conflict("transition_status", move || {
                self.try_transition(actor, request)
            })
            .await?;

        tracing::info!(
            task_id = %task.id(),
            from = %outcome.from,
            to = %outcome.to,
            actor = %actor.id,
            role = %actor.role,
            rework_count = task.rework_count(),
            "task status changed"
        );
        self.after_transition(&task, outcome).await;
        Ok(task)
    }

    /// Assigns the QA reviewer for the current review cycle and notifies
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`], [`WorkflowError::Forbidden`]
    /// for non-managers, [`WorkflowError::NotAwaitingQa`] outside
    /// `WAITING_FOR_QA`, [`WorkflowError::AlreadyAssigned`] when a reviewer
    /// is set, or [`WorkflowError::InvalidQaUser`] when `reviewer` is not a
    /// QA user.
    pub async fn assign_qa(
        &self,
        task_id: TaskId,
        actor: &Actor,
        reviewer: UserId,
    ) -> WorkflowResult<Task> {
        let task = self
            .retry_on_conflict("assign_qa", move || {
                self.try_assign_qa(task_id, actor, reviewer)
            })
            .await?;

        tracing::info!(
            %task_id,
            reviewer = %reviewer,
            assigned_by = %actor.id,
            "QA reviewer assigned"
        );
        self.dispatch(NotificationEvent::TaskAssigned { assignee: reviewer }, &task)
            .await;
        Ok(task)
    }

    /// Applies a partial edit. A change of assignee notifies the new
    /// assignee and, when the status allows a running timer, starts one for
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`], [`WorkflowError::Forbidden`]
    /// for non-managers, or [`WorkflowError::Validation`] naming the first
    /// rejected field (`fields` when the edit is empty).
    pub async fn edit_fields(
        &self,
        task_id: TaskId,
        actor: &Actor,
        edit: &TaskEdit,
    ) -> WorkflowResult<Task> {
        let (task, reassigned) = self
            .retry_on_conflict("edit_fields", move || self.try_edit(task_id, actor, edit))
            .await?;
        tracing::info!(%task_id, edited_by = %actor.id, "task fields updated");

        if let Some(assignee) = reassigned {
            tracing::info!(%task_id, %assignee, "task reassigned");
            self.dispatch(NotificationEvent::TaskAssigned { assignee }, &task)
                .await;
            if task.status().allows_running_timer() {
                if let Err(error) = self.timers.start_for_assignee(&task).await {
                    tracing::warn!(%task_id, %assignee, %error, "could not start timer for new assignee");
                }
            }
        }
        Ok(task)
    }

    /// Asks the oversight group for help on the actor's task and returns
    /// the users notified.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`], [`WorkflowError::Forbidden`]
    /// unless the actor is the task's worker assignee, or a notification
    /// error when recipients cannot be resolved.
    pub async fn request_help(
        &self,
        task_id: TaskId,
        actor: &Actor,
        detail: Option<String>,
    ) -> WorkflowResult<Vec<UserId>> {
        let task = self.load(task_id).await?;
        if !actor.role.is_worker() || actor.id != task.assigned_to() {
            return Err(forbidden(actor, Some(task_id), "request help"));
        }
        let requester = bounded(self.timeout, self.users.find_by_id(actor.id))
            .await?
            .unwrap_or_else(|| {
                UserProfile::new(actor.id, actor.id.to_string(), actor.role).with_team(task.team())
            });

        let deliveries = self
            .dispatcher
            .notify(NotificationEvent::HelpRequest { requester, detail }, &task)
            .await?;
        tracing::info!(%task_id, requester = %actor.id, notified = deliveries.len(), "help requested");
        Ok(deliveries
            .into_iter()
            .map(|delivery| delivery.recipient)
            .collect())
    }

    /// Returns a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::NotFound`] or a storage error.
    pub async fn find_task(&self, task_id: TaskId) -> WorkflowResult<Task> {
        self.load(task_id).await
    }

    /// Returns every task owned by a user.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the lookup fails.
    pub async fn tasks_for_assignee(&self, assignee: UserId) -> WorkflowResult<Vec<Task>> {
        Ok(bounded(self.timeout, self.tasks.find_by_assignee(assignee)).await?)
    }

    async fn try_transition(
        &self,
        actor: &Actor,
        request: &TransitionTaskRequest,
    ) -> WorkflowResult<(Task, TransitionOutcome)> {
        let mut task = self.load(request.task_id).await?;
        let from = task.status();
        let target = TaskStatus::try_from(request.target.as_str()).map_err(|_| {
            WorkflowError::InvalidTransition {
                task_id: task.id(),
                from,
                to: request.target.clone(),
            }
        })?;
        if !authorize_transition(actor, task.assigned_to(), from, target) {
            return Err(forbidden(actor, Some(task.id()), "change task status"));
        }

        let expected_version = task.version();
        let outcome = task.transition_to(target, actor, &*self.clock)?;
        if let Some(note) = request.note.clone() {
            task.append_note(actor.id, note, &*self.clock);
        }
        self.commit(&task, expected_version).await?;
        Ok((task, outcome))
    }

    async fn try_assign_qa(
        &self,
        task_id: TaskId,
        actor: &Actor,
        reviewer: UserId,
    ) -> WorkflowResult<Task> {
        let mut task = self.load(task_id).await?;
        if !QA_ASSIGNMENT_GUARD.permits(actor, task.assigned_to()) {
            return Err(forbidden(actor, Some(task_id), "assign QA"));
        }
        let expected_version = task.version();
        task.assign_qa(reviewer, &*self.clock)?;
        if !self.is_qa_user(reviewer).await? {
            return Err(WorkflowError::InvalidQaUser(reviewer));
        }
        self.commit(&task, expected_version).await?;
        Ok(task)
    }

    async fn try_edit(
        &self,
        task_id: TaskId,
        actor: &Actor,
        edit: &TaskEdit,
    ) -> WorkflowResult<(Task, Option<UserId>)> {
        let mut task = self.load(task_id).await?;
        if !FIELD_EDIT_GUARD.permits(actor, task.assigned_to()) {
            return Err(forbidden(actor, Some(task_id), "edit tasks"));
        }
        if edit.is_empty() {
            return Err(WorkflowError::Validation {
                field: "fields",
                reason: "the edit changes nothing".to_owned(),
            });
        }
        let changes = self.validate_edit(&task, edit).await?;
        let expected_version = task.version();
        let reassigned = task
            .apply_changes(changes, &*self.clock)
            .map_err(|error| match error {
                TaskDomainError::QaAlreadyAssigned(_) => WorkflowError::Validation {
                    field: "qa_reviewer",
                    reason: "a QA reviewer is already assigned".to_owned(),
                },
                other => other.into(),
            })?;
        self.commit(&task, expected_version).await?;
        Ok((task, reassigned))
    }

    async fn validate_edit(&self, task: &Task, edit: &TaskEdit) -> WorkflowResult<TaskFieldChanges> {
        if let Some(assignee) = edit.assigned_to {
            if !self.is_eligible_assignee(assignee, task.team()).await? {
                return Err(WorkflowError::Validation {
                    field: "assigned_to",
                    reason: format!("user {assignee} is not a worker in the {} team", task.team()),
                });
            }
        }
        if let Some(reviewer) = edit.qa_reviewer {
            if !self.is_qa_user(reviewer).await? {
                return Err(WorkflowError::Validation {
                    field: "qa_reviewer",
                    reason: format!("user {reviewer} is not a QA reviewer"),
                });
            }
        }
        Ok(TaskFieldChanges {
            title: edit.title.clone(),
            description: edit.description.clone(),
            priority: edit.priority,
            assigned_to: edit.assigned_to,
            qa_reviewer: edit.qa_reviewer,
            estimated_minutes: edit
                .estimated_minutes
                .map(EstimatedMinutes::new)
                .transpose()?,
            attachments: edit.attachments.clone().map(parse_attachments).transpose()?,
        })
    }

    /// Runs post-commit side effects for a transition.
    async fn after_transition(&self, task: &Task, outcome: TransitionOutcome) {
        if !outcome.to.allows_running_timer() {
            if let Err(error) = self.timers.stop_task_timer(task.id()).await {
                tracing::warn!(task_id = %task.id(), %error, "could not close timer after transition");
            }
        }

        let event = match (outcome.from, outcome.to) {
            (TaskStatus::InProgress, TaskStatus::WaitingForQa) => {
                NotificationEvent::QaReviewRequested {
                    reviewer: outcome.released_reviewer,
                }
            }
            (TaskStatus::Rework, TaskStatus::WaitingForQa) => NotificationEvent::TaskResubmitted {
                previous_reviewer: task.last_qa_reviewer(),
            },
            (_, TaskStatus::Rework) => NotificationEvent::TaskRework,
            (_, TaskStatus::Approved) => NotificationEvent::TaskApproved,
            _ => return,
        };
        self.dispatch(event, task).await;
    }

    /// Sends a notification whose failure must not fail the operation.
    async fn dispatch(&self, event: NotificationEvent, task: &Task) {
        let name = event.name();
        if let Err(error) = self.dispatcher.notify(event, task).await {
            tracing::warn!(task_id = %task.id(), event = name, %error, "notification side effect failed");
        }
    }

    async fn retry_on_conflict<R, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt_once: F,
    ) -> WorkflowResult<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = WorkflowResult<R>>,
    {
        let mut attempt: u8 = 0;
        loop {
            match attempt_once().await {
                Err(WorkflowError::Storage(error))
                    if error.is_conflict() && attempt < self.max_conflict_retries =>
                {
                    attempt = attempt.saturating_add(1);
                    tracing::debug!(operation, attempt, "retrying after concurrent modification");
                }
                result => return result,
            }
        }
    }

    async fn load(&self, task_id: TaskId) -> WorkflowResult<Task> {
        bounded(self.timeout, self.tasks.find_by_id(task_id))
            .await?
            .ok_or(WorkflowError::NotFound(task_id))
    }

    async fn commit(&self, task: &Task, expected_version: u64) -> WorkflowResult<()> {
        bounded(self.timeout, self.tasks.update(task, expected_version))
            .await
            .map_err(|error| match error {
                StorageError::Missing { .. } => WorkflowError::NotFound(task.id()),
                other => WorkflowError::Storage(other),
            })
    }

    async fn is_eligible_assignee(&self, user: UserId, team: TeamCategory) -> WorkflowResult<bool> {
        let profile = bounded(self.timeout, self.users.find_by_id(user)).await?;
        Ok(profile.is_some_and(|found| found.role().is_worker() && found.team() == Some(team)))
    }

    async fn is_qa_user(&self, user: UserId) -> WorkflowResult<bool> {
        let profile = bounded(self.timeout, self.users.find_by_id(user)).await?;
        Ok(profile.is_some_and(|found| found.role().is_qa()))
    }
}

fn forbidden(actor: &Actor, task_id: Option<TaskId>, action: &'static str) -> WorkflowError {
    tracing::warn!(
        actor = %actor.id,
        role = %actor.role,
        task_id = ?task_id,
        action,
        "operation forbidden"
    );
    WorkflowError::Forbidden {
        actor: actor.id,
        role: actor.role,
        action,
    }
}

fn parse_attachments(raw: Vec<String>) -> Result<Vec<AttachmentRef>, TaskDomainError> {
    raw.into_iter().map(AttachmentRef::new).collect()
}
