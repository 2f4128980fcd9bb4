//! Work timers measured against task estimates.
//!
//! The timer tracker owns the start/stop lifecycle of per-task timers,
//! keeps at most one open timer per task, and classifies a task's timer
//! relative to its estimate (`RUNNING`, `WARNING`, `EXCEEDED`, ...). The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
