//! Shared world state for task workflow BDD scenarios.

use crate::test_helpers::{Workspace, workspace};
use rstest::fixture;
use taskflow::task::{domain::Task, services::WorkflowError};

/// Scenario world for workflow behaviour tests.
pub struct WorkflowWorld {
    pub workspace: Workspace,
    pub task: Option<Task>,
    pub last_error: Option<WorkflowError>,
}

impl WorkflowWorld {
    /// Creates a world over a freshly seeded workspace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            workspace: workspace().expect("seeded workspace"),
            task: None,
            last_error: None,
        }
    }

    /// Returns the scenario task.
    ///
    /// # Errors
    ///
    /// Returns an error when no task has been created yet.
    pub fn task(&self) -> Result<&Task, eyre::Report> {
        self.task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }

    /// Records the outcome of a workflow call.
    pub fn record(&mut self, result: Result<Task, WorkflowError>) {
        match result {
            Ok(task) => {
                self.task = Some(task);
                self.last_error = None;
            }
            Err(error) => self.last_error = Some(error),
        }
    }
}

impl Default for WorkflowWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> WorkflowWorld {
    WorkflowWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
