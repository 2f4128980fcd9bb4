//! Adapter implementations for notification ports.

pub mod memory;
