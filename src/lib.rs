// src/lib.rs

pub mod backend;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod explain;
pub mod models;
pub mod runner;
pub mod utils;

// Re-export the main surface for convenience
pub use backend::{BackendError, QuizBackend};
pub use cache::ExplanationCache;
pub use cache::store::{KeyValueStore, MemoryStore, StoreError};
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::QuizError;
pub use explain::ExplanationService;
pub use runner::{ActivePhase, Direction, Notice, QuizRunner, RunnerState};
