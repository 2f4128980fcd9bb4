//! Taskflow: task workflow engine with QA review, rework tracking, work
//! timers, and notification fan-out.
//!
//! # Architecture
//!
//! Taskflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for storage and directories
//! - **Adapters**: Concrete implementations of ports (in-memory stores)
//! - **Services**: Orchestration of domain rules and side effects
//!
//! # Modules
//!
//! - [`task`]: Task aggregate, transition table, and workflow engine
//! - [`timer`]: Work timers and estimate threshold detection
//! - [`notification`]: Recipient resolution and notification delivery
//! - [`config`]: Layered engine configuration
//! - [`error`]: Stable error kinds for callers at the boundary
//! - [`storage`]: Storage error type shared by all ports

pub mod config;
pub mod error;
pub mod notification;
pub mod storage;
pub mod task;
pub mod timer;

#[cfg(test)]
mod test_support;
