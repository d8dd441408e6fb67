//! Unified error types for block_engine

use thiserror::Error;

/// Main error type for block_engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    // === Persisted State Errors ===
    #[error("Malformed history: {message}")]
    MalformedHistory { message: String },

    // === Model Errors ===
    #[error("Block '{id}' not found")]
    BlockNotFound { id: String },

    #[error("Unknown surface: {name}")]
    UnknownSurface { name: String },

    #[error("Unknown block kind: {name}")]
    UnknownBlockKind { name: String },

    // === External Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Generic(String),
}

/// Result type alias for block_engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

// === Convenience constructors ===
impl EngineError {
    pub fn malformed_history(msg: impl Into<String>) -> Self {
        Self::MalformedHistory { message: msg.into() }
    }

    pub fn block_not_found(id: impl Into<String>) -> Self {
        Self::BlockNotFound { id: id.into() }
    }

    /// Create a generic error from any displayable type
    pub fn generic(msg: impl std::fmt::Display) -> Self {
        Self::Generic(msg.to_string())
    }
}
