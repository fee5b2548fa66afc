//! Error types for AdventureMeets workers.

use thiserror::Error;

/// Result alias used across the workspace.
pub type Result<T> = std::result::Result<T, MeetsError>;

/// Errors surfaced by the scheduler and its stores.
#[derive(Debug, Error)]
pub enum MeetsError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The store could not be reached. Nothing was executed.
    #[error("Connection error: {0}")]
    Connection(String),

    /// A single bulk statement failed. Earlier statements stay committed.
    #[error("Statement failed in phase '{phase}': {message}")]
    Statement { phase: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MeetsError {
    /// Whether the error happened before any statement ran.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
