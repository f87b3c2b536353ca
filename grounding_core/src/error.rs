//! Error types for the grounding_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for grounding_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// An exercise definition breaks a catalog invariant
    #[error("Invalid catalog entry '{id}': {reason}")]
    InvalidCatalogEntry { id: String, reason: String },

    /// Catalog-wide validation error
    #[error("Catalog validation error: {0}")]
    CatalogValidation(String),

    /// Requested exercise id is not in the catalog
    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn invalid_entry(id: &str, reason: impl Into<String>) -> Self {
        Error::InvalidCatalogEntry {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
