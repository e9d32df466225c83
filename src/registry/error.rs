use thiserror::Error;

/// Failures reported by registry operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegistryError {
    /// A required field is missing or a supplied value is out of range
    #[error("Validation failed: {0}")]
    Validation(String),
    /// No listing exists with the given id
    #[error("Model not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
