//! Application services for timer tracking.

mod locks;
mod tracker;

pub use locks::{TaskLockGuard, TaskLocks};
pub use tracker::{TimerError, TimerResult, TimerTracker};
