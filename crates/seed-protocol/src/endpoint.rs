use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use seed_types::BatchStatus;

use crate::error::ProtocolResult;

/// HTTP endpoint paths.
pub mod endpoints {
    // validator REST API
    pub const BATCHES: &str = "/batches";
    pub const BATCH_STATUSES: &str = "/batch_statuses";
    pub const STATE: &str = "/state";

    // certification facade
    pub const CERTIFY: &str = "/certify";
    pub const VERIFY: &str = "/verify";
    pub const HEALTH: &str = "/health";
}

/// Content type of a serialized batch list.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Body returned by `POST /batches`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitBatchesResponse {
    pub link: String,
}

/// Body returned by `GET /batch_statuses?id=...`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatusList {
    pub data: Vec<BatchStatusEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStatusEntry {
    pub id: String,
    pub status: BatchStatus,
    #[serde(default)]
    pub invalid_transactions: Vec<InvalidTransactionEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidTransactionEntry {
    pub id: String,
    pub message: String,
}

impl BatchStatusList {
    /// Status of the first entry; an empty list means the ledger does not know the batch.
    pub fn first_status(&self) -> BatchStatus {
        self.data
            .first()
            .map(|e| e.status)
            .unwrap_or(BatchStatus::Unknown)
    }

    /// Concatenated rejection messages of the first entry.
    pub fn rejection_reason(&self) -> Option<String> {
        let entry = self.data.first()?;
        if entry.invalid_transactions.is_empty() {
            return None;
        }
        Some(
            entry
                .invalid_transactions
                .iter()
                .map(|t| t.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Body returned by `GET /state/{address}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    /// Base64 of the stored value.
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
}

impl StateResponse {
    pub fn from_bytes(value: &[u8]) -> Self {
        Self {
            data: STANDARD.encode(value),
            head: None,
        }
    }

    pub fn decode_data(&self) -> ProtocolResult<Vec<u8>> {
        Ok(STANDARD.decode(self.data.as_bytes())?)
    }
}

/// Body of `POST /certify`. Same shape as a `create` payload minus `action`.
pub type CertifyRequest = seed_types::CreateRecord;

/// Body returned by a successful `POST /certify`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifyResponse {
    pub success: bool,
    pub message: String,
    #[serde(alias = "seedId")]
    pub record_id: String,
    pub transaction_id: String,
    /// Facades that confirm synchronously omit this field.
    #[serde(default = "committed_when_absent")]
    pub committed: bool,
    #[serde(alias = "type")]
    pub backend_type: String,
}

fn committed_when_absent() -> bool {
    true
}

/// Body returned by `GET /health`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub backend_type: String,
}

impl HealthResponse {
    pub fn ok(backend_type: impl Into<String>) -> Self {
        Self {
            status: "ok".into(),
            backend_type: backend_type.into(),
        }
    }
}

/// Machine-readable failure class carried by facade error bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    ValidationFailed,
    SubmissionFailed,
    TransactionRejected,
    NotFound,
    /// The ledger could not be queried; answered with 404 like an absent record.
    LookupFailed,
    InternalError,
}

/// Body of every non-2xx facade response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub error: ErrorCode,
    pub message: String,
}

impl FailureResponse {
    pub fn new(error: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error,
            message: message.into(),
        }
    }
}
