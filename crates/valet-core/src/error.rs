use thiserror::Error;

/// Top-level error type for the valet shell.
///
/// Subsystem crates define their own error types and convert into
/// `ValetError` at the composition boundary so that `?` works across
/// crate seams.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ValetError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for ValetError {
    fn from(err: toml::de::Error) -> Self {
        ValetError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for ValetError {
    fn from(err: toml::ser::Error) -> Self {
        ValetError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for ValetError {
    fn from(err: serde_json::Error) -> Self {
        ValetError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for valet operations.
pub type Result<T> = std::result::Result<T, ValetError>;
