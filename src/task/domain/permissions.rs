//! Declarative transition table and actor authorization.
//!
//! [`TRANSITION_TABLE`] is the single source of truth for which status
//! changes exist and who may request them. Authorization is evaluated
//! before structural legality so that a caller without the required role
//! learns nothing about the task's current state.

use super::{Actor, TaskStatus, UserId};

/// Who may request a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionGuard {
    /// Any authenticated actor.
    AnyActor,
    /// Only the task's assignee.
    Assignee,
    /// The assignee, or an oversight role acting on their behalf.
    AssigneeOrManager,
    /// A QA reviewer.
    QaReviewer,
    /// Admin, project manager, or team lead.
    Manager,
}

impl TransitionGuard {
    /// Returns whether `actor` satisfies the guard for a task owned by
    /// `assignee`.
    #[must_use]
    pub fn permits(self, actor: &Actor, assignee: UserId) -> bool {
        match self {
            Self::AnyActor => true,
            Self::Assignee => actor.id == assignee,
            Self::AssigneeOrManager => actor.id == assignee || actor.role.is_manager(),
            Self::QaReviewer => actor.role.is_qa(),
            Self::Manager => actor.role.is_manager(),
        }
    }
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionRule {
    /// Statuses the rule applies from.
    pub from: &'static [TaskStatus],
    /// Target status.
    pub to: TaskStatus,
    /// Required actor.
    pub guard: TransitionGuard,
}

impl TransitionRule {
    fn applies(&self, from: TaskStatus, to: TaskStatus) -> bool {
        self.to == to && self.from.contains(&from)
    }
}

/// Status × role matrix for task transitions.
pub const TRANSITION_TABLE: &[TransitionRule] = &[
    TransitionRule {
        from: &[TaskStatus::Pending, TaskStatus::Rework],
        to: TaskStatus::InProgress,
        guard: TransitionGuard::AnyActor,
    },
    TransitionRule {
        from: &[TaskStatus::InProgress],
        to: TaskStatus::WaitingForQa,
        guard: TransitionGuard::Assignee,
    },
    TransitionRule {
        from: &[TaskStatus::Rework],
        to: TaskStatus::WaitingForQa,
        guard: TransitionGuard::AssigneeOrManager,
    },
    TransitionRule {
        from: &[TaskStatus::WaitingForQa],
        to: TaskStatus::Rework,
        guard: TransitionGuard::QaReviewer,
    },
    TransitionRule {
        from: &[TaskStatus::WaitingForQa],
        to: TaskStatus::Approved,
        guard: TransitionGuard::QaReviewer,
    },
    TransitionRule {
        from: &[
            TaskStatus::InProgress,
            TaskStatus::WaitingForQa,
            TaskStatus::Approved,
            TaskStatus::Rework,
        ],
        to: TaskStatus::Pending,
        guard: TransitionGuard::Manager,
    },
];

/// Guard for QA assignment, which is not a status transition.
pub const QA_ASSIGNMENT_GUARD: TransitionGuard = TransitionGuard::Manager;

/// Guard for the full-edit path.
pub const FIELD_EDIT_GUARD: TransitionGuard = TransitionGuard::Manager;

/// Returns whether the state machine has an edge from `from` to `to`.
#[must_use]
pub fn is_transition_allowed(from: TaskStatus, to: TaskStatus) -> bool {
    TRANSITION_TABLE.iter().any(|rule| rule.applies(from, to))
}

/// Returns the guard governing a request to move a task from `from` to
/// `to`.
///
/// When no edge exists the first rule targeting `to` is used, so an
/// unauthorized caller is rejected before learning the edge is illegal.
#[must_use]
pub fn guard_for(from: TaskStatus, to: TaskStatus) -> Option<TransitionGuard> {
    TRANSITION_TABLE
        .iter()
        .find(|rule| rule.applies(from, to))
        .or_else(|| TRANSITION_TABLE.iter().find(|rule| rule.to == to))
        .map(|rule| rule.guard)
}

/// Returns whether `actor` may request the transition on a task owned by
/// `assignee`.
#[must_use]
pub fn authorize_transition(
    actor: &Actor,
    assignee: UserId,
    from: TaskStatus,
    to: TaskStatus,
) -> bool {
    guard_for(from, to).is_some_and(|guard| guard.permits(actor, assignee))
}
