#![forbid(unsafe_code)]

//! Core domain model and session logic for Grounded.
//!
//! This crate provides:
//! - Domain types (exercise definitions, prompt groups, completion records)
//! - Catalog management and validation
//! - Session state and the progression engine
//! - The session controller and completion reporting
//! - Local persistence (WAL, CSV archive, history)

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod session;
pub mod progression;
pub mod completion;
pub mod controller;
pub mod wal;
pub mod csv_rollup;
pub mod history;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, validate_additions, Catalog};
pub use config::Config;
pub use session::{Position, Progress, SessionState};
pub use progression::{transition, Action, Effect, Transition};
pub use completion::{CompletionReporter, JournalReporter, LocalReporter};
pub use controller::{CatalogEntry, ExerciseController};
pub use wal::{CompletionSink, JsonlSink};
pub use history::load_recent_completions;
