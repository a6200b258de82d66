//! Error types for the completion core
//!
//! Malformed documents and cursors are not errors here: they produce
//! empty results at the call site. `CompletionError` covers the backend
//! and configuration boundaries only, and nothing in this crate is fatal;
//! the worst case of any failure is "no suggestion shown this cycle".

use thiserror::Error;

/// Completion pipeline errors
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The suggestion backend rejected a fetch
    #[error("Backend error: {0}")]
    Backend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompletionError {
    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        CompletionError::Backend(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        CompletionError::Config(message.into())
    }
}

/// Re-export commonly used Result type
pub type CompletionResult<T> = std::result::Result<T, CompletionError>;
