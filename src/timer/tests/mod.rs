//! Unit tests for the timer module.
