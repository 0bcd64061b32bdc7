//! Error types for the preview boundary

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreviewError {
    #[error("Style query for {uid} timed out after {timeout_ms} ms")]
    QueryTimeout { uid: String, timeout_ms: u64 },

    #[error("Rendering surface disconnected")]
    Disconnected,

    #[error("Invalid surface message: {0}")]
    Protocol(String),
}

impl From<serde_json::Error> for PreviewError {
    fn from(err: serde_json::Error) -> Self {
        PreviewError::Protocol(err.to_string())
    }
}
