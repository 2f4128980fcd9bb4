//! Event-specific recipient pools.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::notification::domain::{Delivery, NotificationEvent, NotificationKind};
use crate::storage::{StorageResult, bounded};
use crate::task::{
    domain::{Role, Task, TeamCategory, UserId},
    ports::UserDirectory,
};

/// Ordered, de-duplicated list of deliveries.
#[derive(Debug, Default)]
struct DeliveryPlan {
    deliveries: Vec<Delivery>,
    seen: HashSet<Delivery>,
}

impl DeliveryPlan {
    fn push(&mut self, recipient: UserId, kind: NotificationKind) {
        let delivery = Delivery::new(recipient, kind);
        if self.seen.insert(delivery) {
            self.deliveries.push(delivery);
        }
    }

    fn extend(&mut self, recipients: impl IntoIterator<Item = UserId>, kind: NotificationKind) {
        for recipient in recipients {
            self.push(recipient, kind);
        }
    }
}

/// Computes who receives which notification for an event.
#[derive(Clone)]
pub struct RecipientResolver<U>
where
    U: UserDirectory,
{
    users: Arc<U>,
    timeout: Duration,
}

impl<U> RecipientResolver<U>
where
    U: UserDirectory,
{
    /// Creates a resolver over the user directory.
    #[must_use]
    pub const fn new(users: Arc<U>, timeout: Duration) -> Self {
        Self { users, timeout }
    }

    /// Resolves the deliveries for `event` on `task`.
    ///
    /// A user holding several roles in one pool receives a single
    /// notification of each kind.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the directory cannot be queried.
    pub async fn resolve(
        &self,
        event: &NotificationEvent,
        task: &Task,
    ) -> StorageResult<Vec<Delivery>> {
        let mut plan = DeliveryPlan::default();
        match event {
            NotificationEvent::TaskAssigned { assignee } => {
                plan.push(*assignee, NotificationKind::TaskAssigned);
            }
            NotificationEvent::QaReviewRequested { reviewer } => {
                let review_target = match reviewer {
                    Some(assigned) => Some(*assigned),
                    None => self.fallback_project_manager().await?,
                };
                if let Some(target) = review_target {
                    plan.push(target, NotificationKind::TaskCompleted);
                } else {
                    tracing::debug!(task_id = %task.id(), "no QA reviewer or project manager to notify");
                }
                plan.extend(
                    self.oversight(Some(task.team())).await?,
                    NotificationKind::ReadyForAssignment,
                );
            }
            NotificationEvent::TaskRework => {
                plan.extend(self.oversight(None).await?, NotificationKind::TaskRework);
                plan.push(task.assigned_to(), NotificationKind::TaskRework);
            }
            NotificationEvent::TaskApproved => {
                plan.extend(self.oversight(None).await?, NotificationKind::TaskApproved);
                plan.push(task.assigned_to(), NotificationKind::TaskApproved);
            }
            NotificationEvent::TaskResubmitted { previous_reviewer } => {
                if let Some(reviewer) = previous_reviewer {
                    plan.push(*reviewer, NotificationKind::TaskResubmitted);
                }
                plan.extend(self.oversight(None).await?, NotificationKind::TaskResubmitted);
            }
            NotificationEvent::HelpRequest { requester, .. } => {
                let team = requester.team().unwrap_or_else(|| task.team());
                plan.extend(self.oversight(Some(team)).await?, NotificationKind::HelpRequest);
            }
            NotificationEvent::TimeExceeded => {
                plan.extend(
                    self.oversight(Some(task.team())).await?,
                    NotificationKind::TimeExceeded,
                );
            }
        }

        tracing::debug!(
            task_id = %task.id(),
            event = event.name(),
            recipients = plan.deliveries.len(),
            "resolved notification recipients"
        );
        Ok(plan.deliveries)
    }

    /// Admins and project managers, plus team leads of `team` (all team
    /// leads when `team` is `None`).
    async fn oversight(&self, team: Option<TeamCategory>) -> StorageResult<Vec<UserId>> {
        let mut pool = Vec::new();
        for (role, scope) in [
            (Role::Admin, None),
            (Role::ProjectManager, None),
            (Role::TeamLead, team),
        ] {
            let users = bounded(self.timeout, self.users.find_by_role(role, scope)).await?;
            pool.extend(users.iter().map(|user| user.id()));
        }
        Ok(pool)
    }

    async fn fallback_project_manager(&self) -> StorageResult<Option<UserId>> {
        let managers = bounded(
            self.timeout,
            self.users.find_by_role(Role::ProjectManager, None),
        )
        .await?;
        Ok(managers.first().map(|manager| manager.id()))
    }
}
