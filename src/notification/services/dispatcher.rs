//! Notification dispatcher: resolves, renders, and fans out notifications.

use minijinja::{Environment, Value, context};
use mockable::Clock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;

use super::RecipientResolver;
use crate::config::EngineConfig;
use crate::error::{ClassifiedError, ErrorKind};
use crate::notification::{
    domain::{Delivery, Notification, NotificationEvent, NotificationId, NotificationKind},
    ports::NotificationRepository,
};
use crate::storage::{StorageError, bounded};
use crate::task::{
    domain::{EstimatedMinutes, Task, UserId},
    ports::UserDirectory,
};

/// Service-level errors for notification operations.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Repository or directory operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A message template failed to render.
    #[error("failed to render {kind} message: {reason}")]
    Template {
        /// Kind whose template failed.
        kind: NotificationKind,
        /// Renderer message.
        reason: String,
    },
    /// No notification exists with the given identifier.
    #[error("notification {0} not found")]
    NotFound(NotificationId),
}

impl ClassifiedError for NotificationError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(_) => ErrorKind::StorageError,
            Self::Template { .. } => ErrorKind::ValidationError,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}

/// Result type for notification service operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// Notification fan-out service.
pub struct NotificationDispatcher<N, U, C>
where
    N: NotificationRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    notifications: Arc<N>,
    resolver: RecipientResolver<U>,
    clock: Arc<C>,
    timeout: Duration,
}

impl<N, U, C> NotificationDispatcher<N, U, C>
where
    N: NotificationRepository + 'static,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(notifications: Arc<N>, users: Arc<U>, clock: Arc<C>, config: &EngineConfig) -> Self {
        let timeout = config.storage_timeout();
        Self {
            notifications,
            resolver: RecipientResolver::new(users, timeout),
            clock,
            timeout,
        }
    }

    /// Notifies every recipient of `event` and returns the deliveries that
    /// were stored.
    ///
    /// Writes run concurrently and are joined before returning. A failed
    /// write is logged and left out of the result; it never aborts the
    /// other writes. Events that may fire only once per task are written as
    /// one batch through [`NotificationRepository::store_once_for_task`], so
    /// the store itself decides whether an earlier notification wins.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when recipients cannot be resolved, a
    /// message cannot be rendered, or a once-per-task batch cannot be
    /// written. Nothing is stored in those cases.
    pub async fn notify(
        &self,
        event: NotificationEvent,
        task: &Task,
    ) -> NotificationResult<Vec<Delivery>> {
        let once_kind = event.once_per_task();
        if let Some(kind) = once_kind {
            let already_sent = bounded(
                self.timeout,
                self.notifications.exists_for_task(task.id(), kind),
            )
            .await?;
            if already_sent {
                tracing::debug!(task_id = %task.id(), %kind, "notification already sent for task");
                return Ok(Vec::new());
            }
        }

        let deliveries = self.resolver.resolve(&event, task).await?;
        let messages = render_messages(&event, task, &deliveries)?;
        let planned: Vec<(Delivery, Notification)> = deliveries
            .into_iter()
            .map(|delivery| {
                let message = messages.get(&delivery.kind).cloned().unwrap_or_default();
                let notification = Notification::new(
                    delivery.recipient,
                    task.id(),
                    delivery.kind,
                    message,
                    &*self.clock,
                );
                (delivery, notification)
            })
            .collect();

        let mut delivered = match once_kind {
            Some(kind) => self.store_once(task, kind, planned).await?,
            None => self.store_each(task, planned).await,
        };
        delivered.sort_by_key(|delivery| (delivery.recipient, delivery.kind.as_str()));

        tracing::info!(
            task_id = %task.id(),
            event = event.name(),
            delivered = delivered.len(),
            "notifications dispatched"
        );
        Ok(delivered)
    }

    /// Marks a notification read.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError::NotFound`] for unknown identifiers or a
    /// storage error.
    pub async fn mark_read(&self, id: NotificationId) -> NotificationResult<Notification> {
        bounded(self.timeout, self.notifications.mark_read(id))
            .await?
            .ok_or(NotificationError::NotFound(id))
    }

    /// Returns a user's unread notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the lookup fails.
    pub async fn unread_for_user(&self, user_id: UserId) -> NotificationResult<Vec<Notification>> {
        let all = bounded(self.timeout, self.notifications.find_by_user(user_id)).await?;
        Ok(all
            .into_iter()
            .filter(|notification| !notification.is_read())
            .collect())
    }

    /// Writes a once-per-task batch atomically. Returns no deliveries when
    /// another writer recorded the kind first.
    async fn store_once(
        &self,
        task: &Task,
        kind: NotificationKind,
        planned: Vec<(Delivery, Notification)>,
    ) -> NotificationResult<Vec<Delivery>> {
        let (deliveries, rows): (Vec<Delivery>, Vec<Notification>) = planned.into_iter().unzip();
        let stored = bounded(
            self.timeout,
            self.notifications.store_once_for_task(task.id(), kind, &rows),
        )
        .await?;
        if stored {
            Ok(deliveries)
        } else {
            tracing::debug!(task_id = %task.id(), %kind, "notification recorded by another writer");
            Ok(Vec::new())
        }
    }

    async fn store_each(
        &self,
        task: &Task,
        planned: Vec<(Delivery, Notification)>,
    ) -> Vec<Delivery> {
        let mut writes = JoinSet::new();
        for (delivery, notification) in planned {
            let repository = Arc::clone(&self.notifications);
            let timeout = self.timeout;
            writes.spawn(async move {
                let outcome = bounded(timeout, repository.store(&notification)).await;
                (delivery, outcome)
            });
        }

        let mut delivered = Vec::new();
        while let Some(joined) = writes.join_next().await {
            match joined {
                Ok((delivery, Ok(()))) => delivered.push(delivery),
                Ok((delivery, Err(error))) => tracing::warn!(
                    task_id = %task.id(),
                    recipient = %delivery.recipient,
                    kind = %delivery.kind,
                    %error,
                    "notification delivery failed"
                ),
                Err(error) => tracing::warn!(
                    task_id = %task.id(),
                    %error,
                    "notification delivery task aborted"
                ),
            }
        }
        delivered
    }
}

/// Renders one message per notification kind present in `deliveries`.
fn render_messages(
    event: &NotificationEvent,
    task: &Task,
    deliveries: &[Delivery],
) -> NotificationResult<HashMap<NotificationKind, String>> {
    let environment = Environment::new();
    let (requester, detail) = match event {
        NotificationEvent::HelpRequest { requester, detail } => {
            (Some(requester.name().to_owned()), detail.clone())
        }
        _ => (None, None),
    };
    let template_context = context! {
        title => task.title(),
        team => task.team().as_str(),
        rework_count => task.rework_count(),
        estimate => task.estimated_minutes().map(EstimatedMinutes::minutes),
        requester => requester,
        detail => detail,
    };

    let mut messages = HashMap::new();
    for delivery in deliveries {
        if messages.contains_key(&delivery.kind) {
            continue;
        }
        let rendered = render(&environment, delivery.kind, template_context.clone())?;
        messages.insert(delivery.kind, rendered);
    }
    Ok(messages)
}

fn render(
    environment: &Environment<'_>,
    kind: NotificationKind,
    template_context: Value,
) -> NotificationResult<String> {
    environment
        .render_str(kind.template(), template_context)
        .map_err(|error| NotificationError::Template {
            kind,
            reason: error.to_string(),
        })
}
