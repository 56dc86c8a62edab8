use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use seed_protocol::{ErrorCode, FailureResponse};
use seed_sync::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid request: {0}")]
    Validation(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("record lookup failed: {0}")]
    LookupFailed(String),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("ledger error: {0}")]
    Ledger(#[from] seed_ledger::LedgerError),

    #[error("signer error: {0}")]
    Signer(#[from] seed_crypto::SignerError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) | Self::Sync(SyncError::Validation(_)) => {
                ErrorCode::ValidationFailed
            }
            Self::NotFound(_) => ErrorCode::NotFound,
            Self::LookupFailed(_) => ErrorCode::LookupFailed,
            Self::Sync(SyncError::TransactionRejected(_)) => ErrorCode::TransactionRejected,
            Self::Sync(
                SyncError::SubmissionFailed(_)
                | SyncError::Transport(_)
                | SyncError::UnexpectedStatus { .. }
                | SyncError::AllBackendsFailed(_),
            ) => ErrorCode::SubmissionFailed,
            _ => ErrorCode::InternalError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code() {
            ErrorCode::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound | ErrorCode::LookupFailed => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else if matches!(self, Self::LookupFailed(_)) {
            tracing::warn!(error = %self, "record lookup failed");
        }
        (status, Json(FailureResponse::new(self.code(), self.to_string()))).into_response()
    }
}
