//! Error types for the catalog builder crate.

use catalog_common::CatalogError;
use thiserror::Error;

/// Errors that can occur while crawling, building or exporting a catalog.
#[derive(Error, Debug)]
pub enum BuilderError {
    #[error("Storage failure: {0}")]
    Storage(#[from] CatalogError),

    #[error("Invalid glob pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid builder settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid export settings: {0}")]
    InvalidExport(String),

    #[error("Column '{column}' used as {role} is not a catalog column")]
    UnknownColumn { column: String, role: &'static str },

    #[error("Catalog '{0}' has no valid records to export")]
    EmptyCatalog(String),

    #[error("Failed to write CSV: {0}")]
    Csv(String),

    #[error("Invalid catalog document at {location}: {message}")]
    InvalidDocument { location: String, message: String },
}

impl From<serde_json::Error> for BuilderError {
    fn from(err: serde_json::Error) -> Self {
        BuilderError::Storage(CatalogError::from(err))
    }
}

/// Result type for builder operations.
pub type Result<T> = std::result::Result<T, BuilderError>;
