use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The ledger refused the batch at ingestion (non-2xx or unreachable).
    #[error("submission failed: {0}")]
    SubmissionFailed(String),

    /// The ledger processed the batch and marked it invalid.
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    #[error("all backends failed: {}", .0.join("; "))]
    AllBackendsFailed(Vec<String>),

    #[error("signer error: {0}")]
    Signer(#[from] seed_crypto::SignerError),

    #[error("ledger error: {0}")]
    Ledger(#[from] seed_ledger::LedgerError),
}

impl SyncError {
    /// Whether another backend may be tried after this failure.
    ///
    /// A rejection is deterministic for the payload, so only
    /// `TransactionRejected` stops the fallback chain.
    pub fn is_fallback_eligible(&self) -> bool {
        !matches!(self, Self::TransactionRejected(_))
    }
}

impl From<seed_protocol::ProtocolError> for SyncError {
    fn from(e: seed_protocol::ProtocolError) -> Self {
        Self::Decode(e.to_string())
    }
}

impl From<seed_types::TypeError> for SyncError {
    fn from(e: seed_types::TypeError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
