use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("serialization error: {0}")]
    Serialization(String),
}
