use seed_types::TypeError;

/// Rejection of a single transaction by a handler.
///
/// Every variant is deterministic given the payload and current state:
/// resubmitting the same transaction yields the same rejection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    #[error("invalid payload: {0}")]
    Validation(String),

    #[error("invalid signature for record {record_id}: {reason}")]
    SignatureInvalid { record_id: String, reason: String },

    #[error("record {0} already exists")]
    AlreadyExists(String),

    #[error("record {0} does not exist")]
    NotFound(String),

    #[error("failed to set state for record {0}")]
    StateWriteFailed(String),

    #[error("context error: {0}")]
    Context(#[from] ContextError),
}

impl From<TypeError> for ApplyError {
    fn from(e: TypeError) -> Self {
        Self::Validation(e.to_string())
    }
}

/// Errors raised by a transaction context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("address {0} is not declared in the transaction {1}")]
    Unauthorized(String, &'static str),
}

/// Errors produced by the ledger runtime.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("stored record is corrupt: {0}")]
    CorruptRecord(String),

    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl From<seed_protocol::ProtocolError> for LedgerError {
    fn from(e: seed_protocol::ProtocolError) -> Self {
        Self::Decode(e.to_string())
    }
}
