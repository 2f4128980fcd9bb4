//! Port contracts for timer persistence.

pub mod repository;

pub use repository::TimerRepository;
