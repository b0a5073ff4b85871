//! Error types for the session engine.

use thiserror::Error;

/// Errors from the chat session engine.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("voice error: {0}")]
    Voice(String),
    #[error("action error: {0}")]
    Action(String),
    #[error("export failed: {0}")]
    Export(String),
}

impl From<valet_store::StoreError> for SessionError {
    fn from(err: valet_store::StoreError) -> Self {
        SessionError::Export(err.to_string())
    }
}

impl From<SessionError> for valet_core::ValetError {
    fn from(err: SessionError) -> Self {
        valet_core::ValetError::Session(err.to_string())
    }
}
