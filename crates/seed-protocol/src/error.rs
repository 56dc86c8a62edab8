use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("invalid base64 state data: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload error: {0}")]
    Payload(#[from] seed_types::TypeError),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
