//! Request types accepted by the workflow engine.

use crate::task::domain::{NoteBody, Priority, ProjectId, TaskId, TeamCategory, UserId};

/// Request to create a task.
///
/// Required fields are optional here so that absence can be reported as
/// a `missing_field` error rather than a construction failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTaskRequest {
    /// Owning project.
    pub project_id: ProjectId,
    /// Team the task belongs to.
    pub team: Option<TeamCategory>,
    /// Task title.
    pub title: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Priority; defaults to medium.
    pub priority: Priority,
    /// Worker who will own the task.
    pub assigned_to: Option<UserId>,
    /// QA reviewer chosen up front.
    pub qa_reviewer: Option<UserId>,
    /// Work estimate in minutes.
    pub estimated_minutes: Option<u32>,
    /// Attachment references.
    pub attachments: Vec<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the fields every task needs.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        team: TeamCategory,
        title: impl Into<String>,
        assigned_to: UserId,
    ) -> Self {
        Self {
            project_id,
            team: Some(team),
            title: Some(title.into()),
            assigned_to: Some(assigned_to),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Pre-assigns a QA reviewer.
    #[must_use]
    pub const fn with_qa_reviewer(mut self, reviewer: UserId) -> Self {
        self.qa_reviewer = Some(reviewer);
        self
    }

    /// Sets the estimate in minutes.
    #[must_use]
    pub const fn with_estimate(mut self, minutes: u32) -> Self {
        self.estimated_minutes = Some(minutes);
        self
    }

    /// Adds an attachment reference.
    #[must_use]
    pub fn with_attachment(mut self, reference: impl Into<String>) -> Self {
        self.attachments.push(reference.into());
        self
    }
}

/// Request to move a task to another status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTaskRequest {
    /// Task to transition.
    pub task_id: TaskId,
    /// Target status as supplied by the caller.
    pub target: String,
    /// Note recorded with the transition.
    pub note: Option<NoteBody>,
}

impl TransitionTaskRequest {
    /// Creates a transition request without a note.
    #[must_use]
    pub fn new(task_id: TaskId, target: impl Into<String>) -> Self {
        Self {
            task_id,
            target: target.into(),
            note: None,
        }
    }

    /// Attaches a note such as a rejection reason or feedback image.
    #[must_use]
    pub fn with_note(mut self, note: NoteBody) -> Self {
        self.note = Some(note);
        self
    }
}

/// Partial edit applied through the full-edit path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New assignee.
    pub assigned_to: Option<UserId>,
    /// QA reviewer, accepted only while none is assigned.
    pub qa_reviewer: Option<UserId>,
    /// New estimate in minutes.
    pub estimated_minutes: Option<u32>,
    /// Replacement attachment list.
    pub attachments: Option<Vec<String>>,
}

impl TaskEdit {
    /// Returns whether the edit changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
