//! Task aggregate root and related task lifecycle types.

use super::{
    Actor, AttachmentRef, EstimatedMinutes, NoteBody, ParsePriorityError, ParseTaskStatusError,
    ProjectId, TaskDomainError, TaskId, TaskNote, TeamCategory, UserId, is_transition_allowed,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task is created and waiting for work to begin.
    Pending,
    /// Task is being worked on.
    InProgress,
    /// Work is submitted and waiting for QA review.
    WaitingForQa,
    /// QA accepted the work.
    Approved,
    /// QA sent the work back for changes.
    Rework,
}

impl TaskStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::InProgress,
        Self::WaitingForQa,
        Self::Approved,
        Self::Rework,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::WaitingForQa => "WAITING_FOR_QA",
            Self::Approved => "APPROVED",
            Self::Rework => "REWORK",
        }
    }

    /// Returns whether a work timer may be running in this status.
    #[must_use]
    pub const fn allows_running_timer(self) -> bool {
        !matches!(self, Self::Pending | Self::Approved)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "WAITING_FOR_QA" => Ok(Self::WaitingForQa),
            "APPROVED" => Ok(Self::Approved),
            "REWORK" => Ok(Self::Rework),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    /// Low priority.
    Low,
    /// Medium priority.
    #[default]
    Medium,
    /// High priority.
    High,
}

impl Priority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

/// QA reviewer assignment for the current review cycle.
///
/// Reviewer and timestamp are stored together so they can only be set and
/// cleared as a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaAssignment {
    /// Assigned reviewer.
    pub reviewer: UserId,
    /// When the reviewer was assigned.
    pub assigned_at: DateTime<Utc>,
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    project_id: ProjectId,
    team: TeamCategory,
    priority: Priority,
    title: String,
    description: Option<String>,
    attachments: Vec<AttachmentRef>,
    status: TaskStatus,
    assigned_to: UserId,
    assigned_by: UserId,
    qa_assignment: Option<QaAssignment>,
    last_qa_reviewer: Option<UserId>,
    rework_count: u32,
    estimated_minutes: Option<EstimatedMinutes>,
    notes: Vec<TaskNote>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    version: u64,
}

/// Parameter object for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Owning project.
    pub project_id: ProjectId,
    /// Team category.
    pub team: TeamCategory,
    /// Priority.
    pub priority: Priority,
    /// Title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Worker who owns the task.
    pub assigned_to: UserId,
    /// Manager who created the assignment.
    pub assigned_by: UserId,
    /// QA reviewer chosen up front, if any.
    pub qa_reviewer: Option<UserId>,
    /// Work estimate.
    pub estimated_minutes: Option<EstimatedMinutes>,
    /// Attachments.
    pub attachments: Vec<AttachmentRef>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted project reference.
    pub project_id: ProjectId,
    /// Persisted team category.
    pub team: TeamCategory,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: Option<String>,
    /// Persisted attachments.
    pub attachments: Vec<AttachmentRef>,
    /// Persisted status.
    pub status: TaskStatus,
    /// Persisted assignee.
    pub assigned_to: UserId,
    /// Persisted assigner.
    pub assigned_by: UserId,
    /// Persisted QA assignment.
    pub qa_assignment: Option<QaAssignment>,
    /// Reviewer of the most recent completed review cycle.
    pub last_qa_reviewer: Option<UserId>,
    /// Lifetime rework counter.
    pub rework_count: u32,
    /// Persisted estimate.
    pub estimated_minutes: Option<EstimatedMinutes>,
    /// Persisted notes.
    pub notes: Vec<TaskNote>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
    /// First timer start.
    pub started_at: Option<DateTime<Utc>>,
    /// Approval timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency version.
    pub version: u64,
}

/// Validated partial update applied through the full-edit path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFieldChanges {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New assignee.
    pub assigned_to: Option<UserId>,
    /// QA reviewer to set when none is assigned.
    pub qa_reviewer: Option<UserId>,
    /// New estimate.
    pub estimated_minutes: Option<EstimatedMinutes>,
    /// Replacement attachment list.
    pub attachments: Option<Vec<AttachmentRef>>,
}

/// What a committed transition changed, for side-effect planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// Status before the transition.
    pub from: TaskStatus,
    /// Status after the transition.
    pub to: TaskStatus,
    /// QA reviewer whose assignment the transition cleared.
    pub released_reviewer: Option<UserId>,
}

impl Task {
    /// Creates a new task in [`TaskStatus::Pending`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn new(data: NewTask, clock: &impl Clock) -> Result<Self, TaskDomainError> {
        let title = normalize_title(&data.title)?;
        let timestamp = clock.utc();
        let qa_assignment = data.qa_reviewer.map(|reviewer| QaAssignment {
            reviewer,
            assigned_at: timestamp,
        });

        Ok(Self {
            id: TaskId::new(),
            project_id: data.project_id,
            team: data.team,
            priority: data.priority,
            title,
            description: data.description,
            attachments: data.attachments,
            status: TaskStatus::Pending,
            assigned_to: data.assigned_to,
            assigned_by: data.assigned_by,
            qa_assignment,
            last_qa_reviewer: None,
            rework_count: 0,
            estimated_minutes: data.estimated_minutes,
            notes: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
            started_at: None,
            completed_at: None,
            version: 1,
        })
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            team: data.team,
            priority: data.priority,
            title: data.title,
            description: data.description,
            attachments: data.attachments,
            status: data.status,
            assigned_to: data.assigned_to,
            assigned_by: data.assigned_by,
            qa_assignment: data.qa_assignment,
            last_qa_reviewer: data.last_qa_reviewer,
            rework_count: data.rework_count,
            estimated_minutes: data.estimated_minutes,
            notes: data.notes,
            created_at: data.created_at,
            updated_at: data.updated_at,
            started_at: data.started_at,
            completed_at: data.completed_at,
            version: data.version,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the team category.
    #[must_use]
    pub const fn team(&self) -> TeamCategory {
        self.team
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the attachments.
    #[must_use]
    pub fn attachments(&self) -> &[AttachmentRef] {
        &self.attachments
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the assignee.
    #[must_use]
    pub const fn assigned_to(&self) -> UserId {
        self.assigned_to
    }

    /// Returns the user who made the assignment.
    #[must_use]
    pub const fn assigned_by(&self) -> UserId {
        self.assigned_by
    }

    /// Returns the current QA assignment.
    #[must_use]
    pub const fn qa_assignment(&self) -> Option<QaAssignment> {
        self.qa_assignment
    }

    /// Returns the assigned QA reviewer.
    #[must_use]
    pub fn qa_assigned_to(&self) -> Option<UserId> {
        self.qa_assignment.map(|assignment| assignment.reviewer)
    }

    /// Returns when the QA reviewer was assigned.
    #[must_use]
    pub fn qa_assigned_at(&self) -> Option<DateTime<Utc>> {
        self.qa_assignment.map(|assignment| assignment.assigned_at)
    }

    /// Returns the reviewer of the most recent completed review cycle.
    #[must_use]
    pub const fn last_qa_reviewer(&self) -> Option<UserId> {
        self.last_qa_reviewer
    }

    /// Returns how many times the task has entered rework.
    #[must_use]
    pub const fn rework_count(&self) -> u32 {
        self.rework_count
    }

    /// Returns the work estimate.
    #[must_use]
    pub const fn estimated_minutes(&self) -> Option<EstimatedMinutes> {
        self.estimated_minutes
    }

    /// Returns the notes in recording order.
    #[must_use]
    pub fn notes(&self) -> &[TaskNote] {
        &self.notes
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns when work was first timed.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when the task was approved.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the optimistic-concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Applies a status transition and its derived field changes.
    ///
    /// Entering `REWORK` increments the lifetime rework counter and clears
    /// the QA assignment. Submitting from `IN_PROGRESS` opens a new review
    /// cycle, so the previous assignment is cleared as well.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidStateTransition`] when the state
    /// machine forbids the change. The task is left untouched.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<TransitionOutcome, TaskDomainError> {
        let from = self.status;
        if !is_transition_allowed(from, target) {
            return Err(TaskDomainError::InvalidStateTransition {
                task_id: self.id,
                from,
                to: target,
            });
        }

        let timestamp = clock.utc();
        let released_reviewer = match (from, target) {
            (TaskStatus::InProgress, TaskStatus::WaitingForQa) => self.release_qa(),
            (_, TaskStatus::Rework) => {
                self.rework_count = self.rework_count.saturating_add(1);
                let released = self.release_qa();
                self.last_qa_reviewer = Some(released.unwrap_or(actor.id));
                released
            }
            (_, TaskStatus::Approved) => {
                self.completed_at = Some(timestamp);
                None
            }
            _ => None,
        };
        if from == TaskStatus::Approved {
            self.completed_at = None;
        }

        self.status = target;
        self.touch_at(timestamp);
        Ok(TransitionOutcome {
            from,
            to: target,
            released_reviewer,
        })
    }

    /// Assigns the QA reviewer for the current review cycle.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NotAwaitingQa`] outside `WAITING_FOR_QA`
    /// and [`TaskDomainError::QaAlreadyAssigned`] when a reviewer is set.
    pub fn assign_qa(&mut self, reviewer: UserId, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if self.status != TaskStatus::WaitingForQa {
            return Err(TaskDomainError::NotAwaitingQa {
                task_id: self.id,
                status: self.status,
            });
        }
        self.set_qa_once(reviewer, clock)
    }

    /// Applies a validated partial edit.
    ///
    /// Returns the new assignee when the assignee changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] for a blank title or
    /// [`TaskDomainError::QaAlreadyAssigned`] when the edit would replace an
    /// existing reviewer. Nothing is applied on error.
    pub fn apply_changes(
        &mut self,
        changes: TaskFieldChanges,
        clock: &impl Clock,
    ) -> Result<Option<UserId>, TaskDomainError> {
        let title = changes.title.as_deref().map(normalize_title).transpose()?;
        if let (Some(requested), Some(current)) = (changes.qa_reviewer, self.qa_assigned_to()) {
            if requested != current {
                return Err(TaskDomainError::QaAlreadyAssigned(self.id));
            }
        }

        let timestamp = clock.utc();
        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = changes.description {
            self.description = Some(value);
        }
        if let Some(value) = changes.priority {
            self.priority = value;
        }
        if let Some(value) = changes.estimated_minutes {
            self.estimated_minutes = Some(value);
        }
        if let Some(value) = changes.attachments {
            self.attachments = value;
        }
        if let Some(reviewer) = changes.qa_reviewer {
            self.qa_assignment.get_or_insert(QaAssignment {
                reviewer,
                assigned_at: timestamp,
            });
        }
        let reassigned = changes
            .assigned_to
            .filter(|assignee| *assignee != self.assigned_to);
        if let Some(assignee) = reassigned {
            self.assigned_to = assignee;
        }

        self.touch_at(timestamp);
        Ok(reassigned)
    }

    /// Records the first timer start. Returns `false` when already recorded.
    pub fn record_first_start(&mut self, started_at: DateTime<Utc>, clock: &impl Clock) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(started_at);
        self.touch(clock);
        true
    }

    /// Appends a note to the task's history.
    pub fn append_note(&mut self, author: UserId, body: NoteBody, clock: &impl Clock) {
        let timestamp = clock.utc();
        self.notes.push(TaskNote {
            author,
            body,
            created_at: timestamp,
        });
        self.touch_at(timestamp);
    }

    fn set_qa_once(&mut self, reviewer: UserId, clock: &impl Clock) -> Result<(), TaskDomainError> {
        if self.qa_assignment.is_some() {
            return Err(TaskDomainError::QaAlreadyAssigned(self.id));
        }
        let timestamp = clock.utc();
        self.qa_assignment = Some(QaAssignment {
            reviewer,
            assigned_at: timestamp,
        });
        self.touch_at(timestamp);
        Ok(())
    }

    /// Clears the QA assignment, remembering who held it.
    fn release_qa(&mut self) -> Option<UserId> {
        let released = self.qa_assignment.take().map(|assignment| assignment.reviewer);
        if released.is_some() {
            self.last_qa_reviewer = released;
        }
        released
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.touch_at(clock.utc());
    }

    fn touch_at(&mut self, timestamp: DateTime<Utc>) {
        self.updated_at = timestamp;
        self.version = self.version.saturating_add(1);
    }
}

fn normalize_title(raw: &str) -> Result<String, TaskDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaskDomainError::EmptyTitle);
    }
    Ok(trimmed.to_owned())
}
