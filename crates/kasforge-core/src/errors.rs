//! Operational error types for the kasforge core
//!
//! These errors cover catalog construction and collaborator I/O. They are
//! deliberately separate from the validation findings in
//! [`crate::resolver::findings`]: a finding is data returned to the caller,
//! while a `ForgeError` means an operation itself could not be carried out
//! (a malformed catalog, an unreadable state file, a failed HTTP request).

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ForgeError {
    #[error("Catalog error: {0}")]
    CatalogError(String),
    #[error("Field registry error: {0}")]
    FieldRegistryError(String),
    #[error("State store error: {0}")]
    StateStoreError(String),
    #[error("Release lookup failed for '{repository}': {message}")]
    ReleaseLookupError { repository: String, message: String },
    #[error("Synthesis error: {0}")]
    SynthesisError(String),
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        ForgeError::IoError(err.to_string())
    }
}

impl From<reqwest::Error> for ForgeError {
    fn from(err: reqwest::Error) -> Self {
        ForgeError::ReleaseLookupError {
            repository: err
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "<unknown>".to_string()),
            message: err.to_string(),
        }
    }
}

/// Result type alias used throughout the crate
pub type ForgeResult<T> = Result<T, ForgeError>;
