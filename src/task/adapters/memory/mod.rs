//! In-memory adapters for task workflow tests and embedding.

mod task;
mod users;

pub use task::InMemoryTaskRepository;
pub use users::InMemoryUserDirectory;
