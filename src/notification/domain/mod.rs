//! Domain model for notifications.

mod event;
mod notification;

pub use event::{Delivery, NotificationEvent};
pub use notification::{Notification, NotificationId, NotificationKind};
