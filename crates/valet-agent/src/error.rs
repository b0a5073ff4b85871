//! Error types for the agent client.

use thiserror::Error;

/// Errors from talking to the agent service.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned HTTP {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("server reported failure: {0}")]
    Rejected(String),
}

impl From<AgentError> for valet_core::ValetError {
    fn from(err: AgentError) -> Self {
        valet_core::ValetError::Agent(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::Status(502);
        assert_eq!(err.to_string(), "server returned HTTP 502");

        let err = AgentError::Malformed("missing data".to_string());
        assert_eq!(err.to_string(), "malformed response: missing data");

        let err = AgentError::Rejected("nvidia-smi not found".to_string());
        assert_eq!(
            err.to_string(),
            "server reported failure: nvidia-smi not found"
        );
    }

    #[test]
    fn test_conversion_to_valet_error() {
        let err: valet_core::ValetError = AgentError::Status(404).into();
        assert!(matches!(err, valet_core::ValetError::Agent(_)));
        assert!(err.to_string().contains("404"));
    }
}
