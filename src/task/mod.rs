//! Task lifecycle management for taskflow.
//!
//! This module implements the task state machine: manager-created tasks
//! move through `PENDING`, `IN_PROGRESS`, `WAITING_FOR_QA`, `REWORK`, and
//! `APPROVED` under a declarative status × role transition table. QA
//! reviewers are assigned once per review cycle and a rejection increments
//! the task's lifetime rework counter. The module follows hexagonal
//! architecture:
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
