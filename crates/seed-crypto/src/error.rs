/// Errors from key handling and signer lookup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("unknown signer: {0}")]
    UnknownSigner(String),

    #[error("duplicate signer id: {0}")]
    DuplicateSigner(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("declared public key for {0} does not match its private key")]
    KeyMismatch(String),

    #[error("registry configuration error: {0}")]
    Config(String),
}
