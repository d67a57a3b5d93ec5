//! Error types for the Unhook engine

use thiserror::Error;

/// Errors that can occur while analyzing content
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Stage {stage} failed: {message}")]
    StageFailure { stage: String, message: String },
}

/// Error returned by external provider implementations.
///
/// Provider implementations are expected to enforce their own bounded
/// timeout. The engine treats any provider error as "provider unavailable":
/// the documented deterministic fallback runs instead and the pipeline
/// never fails because of it.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

impl From<ProviderError> for EngineError {
    fn from(e: ProviderError) -> Self {
        EngineError::ProviderUnavailable(e.0)
    }
}
