//! Error types for catalog generation.

use thiserror::Error;

/// Result type alias using CatalogError.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Primary error type for storage and catalog document operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    // === Location Errors ===
    #[error("Invalid storage location '{location}': {message}")]
    InvalidLocation { location: String, message: String },

    #[error("Unsupported storage scheme: {0}")]
    UnsupportedScheme(String),

    // === Storage Errors ===
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    // === Document Errors ===
    #[error("Invalid catalog document: {0}")]
    InvalidDocument(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Unknown data format: {0}")]
    UnknownDataFormat(String),

    #[error("Unknown aggregation type: {0}")]
    UnknownAggregationType(String),
}

impl CatalogError {
    /// Whether the error means the object simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}

// Conversion from common error types
impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::SerializationError(format!("JSON error: {}", err))
    }
}
