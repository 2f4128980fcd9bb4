//! Review feedback attached to tasks.

use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of a task note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoteBody {
    /// Free-form comment.
    Comment {
        /// Comment text.
        text: String,
    },
    /// Reviewer sign-off.
    Approval {
        /// Optional approval remark.
        remark: Option<String>,
    },
    /// Reviewer rejection sending the task to rework.
    Rejection {
        /// Why the work was rejected.
        reason: String,
    },
    /// Annotated screenshot or mock-up.
    FeedbackImage {
        /// Stored image reference.
        image_ref: String,
        /// Optional caption.
        caption: Option<String>,
    },
}

/// Append-only note recorded against a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNote {
    /// Author of the note.
    pub author: UserId,
    /// Note content.
    pub body: NoteBody,
    /// When the note was recorded.
    pub created_at: DateTime<Utc>,
}
