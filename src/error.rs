//! Error type shared by the loaders, filters and the premium calculator

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the dashboard library
///
/// Missing catalog rows and empty selections are not errors: they resolve to
/// zero-valued results inside the pure functions.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Invalid input: {field} ({reason})")]
    InvalidInput { field: String, reason: String },

    #[error("Failed to read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown classification level: {0}")]
    UnknownLevel(u8),

    #[error("Unknown sex label: {0}")]
    UnknownSex(String),

    #[error("Duplicate premium row for level {level}, age {age}")]
    DuplicateCatalogRow { level: u8, age: u8 },
}

impl DashboardError {
    /// Shorthand for boundary validation failures
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        DashboardError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
