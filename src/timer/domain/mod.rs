//! Domain model for work timers.

mod state;
mod timer;

pub use state::{TimerSnapshot, TimerState, WarningThreshold, classify_elapsed, classify_closed};
pub use timer::{Timer, TimerId, rounded_minutes};
