//! In-memory notification adapter.

mod notification;

pub use notification::InMemoryNotificationRepository;
