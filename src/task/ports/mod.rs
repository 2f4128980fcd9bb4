//! Port contracts for the task workflow.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod repository;
pub mod users;

pub use repository::TaskRepository;
pub use users::UserDirectory;
