//! Batch ingress error types

use thiserror::Error;

/// Errors that reject a whole action list before anything runs.
///
/// Problems with a single entry never show up here; they become a `Failed`
/// result for that entry.
#[derive(Debug, Error)]
pub enum FlowError {
    /// Payload is not JSON at all
    #[error("action list is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// JSON, but neither an array nor an object with an `actions` array
    #[error("expected an array of actions or an object with an `actions` array, got {0}")]
    InvalidShape(String),
}
