//! In-memory timer adapter.

mod timer;

pub use timer::InMemoryTimerRepository;
