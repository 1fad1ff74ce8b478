//! Error types for the engine boundary.

use yr_core::YrError;

/// Failure while talking to the engine or applying its answer.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Graph error: {0}")]
    Graph(#[from] YrError),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl EngineError {
    pub fn backend(message: impl Into<String>) -> Self {
        EngineError::Backend {
            message: message.into(),
        }
    }
}

/// Result type for yr-engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
