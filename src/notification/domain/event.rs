//! Events that trigger notification fan-out.

use super::NotificationKind;
use crate::task::domain::{UserId, UserProfile};

/// A workflow or timer event to notify stakeholders about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A user was assigned to the task, as owner or QA reviewer.
    TaskAssigned {
        /// Newly assigned user.
        assignee: UserId,
    },
    /// The assignee moved the task from `IN_PROGRESS` to `WAITING_FOR_QA`.
    QaReviewRequested {
        /// Reviewer assigned before submission, if any.
        reviewer: Option<UserId>,
    },
    /// QA sent the task to rework.
    TaskRework,
    /// QA approved the task.
    TaskApproved,
    /// A reworked task was resubmitted.
    TaskResubmitted {
        /// Reviewer of the previous cycle, if known.
        previous_reviewer: Option<UserId>,
    },
    /// A worker asked for help.
    HelpRequest {
        /// Requesting worker.
        requester: UserProfile,
        /// Optional free-form detail.
        detail: Option<String>,
    },
    /// A running timer reached the estimate.
    TimeExceeded,
}

impl NotificationEvent {
    /// Returns a short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TaskAssigned { .. } => "task_assigned",
            Self::QaReviewRequested { .. } => "qa_review_requested",
            Self::TaskRework => "task_rework",
            Self::TaskApproved => "task_approved",
            Self::TaskResubmitted { .. } => "task_resubmitted",
            Self::HelpRequest { .. } => "help_request",
            Self::TimeExceeded => "time_exceeded",
        }
    }

    /// Returns the kind whose prior existence for the task suppresses the
    /// event entirely.
    #[must_use]
    pub const fn once_per_task(&self) -> Option<NotificationKind> {
        match self {
            Self::TimeExceeded => Some(NotificationKind::TimeExceeded),
            _ => None,
        }
    }
}

/// One planned notification: who receives it and as which kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Delivery {
    /// Recipient.
    pub recipient: UserId,
    /// Notification type.
    pub kind: NotificationKind,
}

impl Delivery {
    /// Creates a delivery.
    #[must_use]
    pub const fn new(recipient: UserId, kind: NotificationKind) -> Self {
        Self { recipient, kind }
    }
}
