//! Application services for notification fan-out.

mod dispatcher;
mod recipients;

pub use dispatcher::{NotificationDispatcher, NotificationError, NotificationResult};
pub use recipients::RecipientResolver;
