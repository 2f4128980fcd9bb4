//! Notification fan-out for workflow and timer events.
//!
//! The dispatcher resolves an event-specific recipient pool, renders a
//! message per recipient, and stores one append-only notification row per
//! recipient. Delivery is best-effort: one failed write never blocks the
//! others and never fails the workflow change that triggered it. The module
//! follows hexagonal architecture:
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
