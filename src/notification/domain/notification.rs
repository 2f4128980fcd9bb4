//! Notification delivery record.

use crate::task::domain::{TaskId, UserId, uuid_identifier};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

uuid_identifier!(
    /// Unique identifier for a notification row.
    NotificationId
);

/// Closed set of notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// A user was made assignee or QA reviewer of a task.
    TaskAssigned,
    /// The assignee submitted work for QA review.
    TaskCompleted,
    /// A submitted task needs a QA reviewer assigned.
    ReadyForAssignment,
    /// QA sent the task back for rework.
    TaskRework,
    /// QA approved the task.
    TaskApproved,
    /// A reworked task was resubmitted for review.
    TaskResubmitted,
    /// A worker asked their team's oversight for help.
    HelpRequest,
    /// A running timer reached the task's estimate.
    TimeExceeded,
}

impl NotificationKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskAssigned => "TASK_ASSIGNED",
            Self::TaskCompleted => "TASK_COMPLETED",
            Self::ReadyForAssignment => "READY_FOR_ASSIGNMENT",
            Self::TaskRework => "TASK_REWORK",
            Self::TaskApproved => "TASK_APPROVED",
            Self::TaskResubmitted => "TASK_RESUBMITTED",
            Self::HelpRequest => "HELP_REQUEST",
            Self::TimeExceeded => "TIME_EXCEEDED",
        }
    }

    /// Returns the message template rendered for this kind.
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::TaskAssigned => "You have been assigned to \"{{ title }}\".",
            Self::TaskCompleted => "\"{{ title }}\" is finished and waiting for QA review.",
            Self::ReadyForAssignment => {
                "\"{{ title }}\" ({{ team }}) is ready for QA assignment."
            }
            Self::TaskRework => {
                "\"{{ title }}\" was sent back for rework (rework #{{ rework_count }})."
            }
            Self::TaskApproved => "\"{{ title }}\" was approved by QA.",
            Self::TaskResubmitted => "\"{{ title }}\" was resubmitted for QA review.",
            Self::HelpRequest => {
                "{{ requester }} needs help with \"{{ title }}\"\
                 {% if detail %}: {{ detail }}{% endif %}"
            }
            Self::TimeExceeded => {
                "\"{{ title }}\" has exceeded its estimate of {{ estimate }} minutes."
            }
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Append-only delivery record; marking it read is the only mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    user_id: UserId,
    task_id: TaskId,
    #[serde(rename = "type")]
    kind: NotificationKind,
    message: String,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl Notification {
    /// Creates an unread notification.
    #[must_use]
    pub fn new(
        user_id: UserId,
        task_id: TaskId,
        kind: NotificationKind,
        message: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            task_id,
            kind,
            message: message.into(),
            is_read: false,
            created_at: clock.utc(),
        }
    }

    /// Returns the notification identifier.
    #[must_use]
    pub const fn id(&self) -> NotificationId {
        self.id
    }

    /// Returns the recipient.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the related task.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the notification type.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        self.kind
    }

    /// Returns the rendered message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether the recipient has read the notification.
    #[must_use]
    pub const fn is_read(&self) -> bool {
        self.is_read
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Marks the notification read.
    pub const fn mark_read(&mut self) {
        self.is_read = true;
    }
}
