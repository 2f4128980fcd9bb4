//! Application services for the task workflow.

mod error;
mod requests;
mod workflow;

pub use error::{WorkflowError, WorkflowResult};
pub use requests::{CreateTaskRequest, TaskEdit, TransitionTaskRequest};
pub use workflow::WorkflowEngine;
