//! Error types for the LLM crate.

use thiserror::Error;

/// Errors from the completion client and the layers above it.
///
/// Callers of the classifier never see these; classification failures
/// degrade to the unknown intent. Extractor errors surface only as far as
/// the orchestrator, which turns them into localized messages.
#[derive(Debug, Error)]
pub enum LlmError {
    /// API key missing or rejected.
    #[error("LLM authentication failed")]
    Authentication,

    /// Transport-level failure.
    #[error("LLM HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint returned a non-success status.
    #[error("LLM API error: {0}")]
    Api(String),

    /// Response body was not the JSON we asked for.
    #[error("LLM returned invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Response parsed as JSON but violated the expected schema.
    #[error("LLM response violated schema: {0}")]
    SchemaViolation(String),

    /// Response structure was unusable (no choices, empty content).
    #[error("invalid LLM response: {0}")]
    InvalidResponse(String),
}
