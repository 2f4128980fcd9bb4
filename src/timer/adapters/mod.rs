//! Adapter implementations for timer ports.

pub mod memory;
