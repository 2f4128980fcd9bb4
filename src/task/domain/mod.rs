//! Domain model for the task workflow.
//!
//! The task domain models the task aggregate, its status machine, the
//! declarative permission matrix, and the actors that drive it, while
//! keeping all infrastructure concerns outside of the domain boundary.

mod error;
mod ids;
mod note;
mod permissions;
mod task;
mod user;

pub use error::{
    ParsePriorityError, ParseRoleError, ParseTaskStatusError, ParseTeamCategoryError,
    TaskDomainError,
};
pub(crate) use ids::uuid_identifier;
pub use ids::{AttachmentRef, EstimatedMinutes, ProjectId, TaskId, UserId};
pub use note::{NoteBody, TaskNote};
pub use permissions::{
    FIELD_EDIT_GUARD, QA_ASSIGNMENT_GUARD, TRANSITION_TABLE, TransitionGuard, TransitionRule,
    authorize_transition, guard_for, is_transition_allowed,
};
pub use task::{
    NewTask, PersistedTaskData, Priority, QaAssignment, Task, TaskFieldChanges, TaskStatus,
    TransitionOutcome,
};
pub use user::{Actor, Role, TeamCategory, UserProfile};
