//! Wire protocol for SeedLedger.
//!
//! Defines the signed transaction/batch envelopes submitted to the ledger
//! (protobuf, field-compatible with the validator's batch format), the
//! builders that produce them, and the JSON bodies exchanged with the
//! validator REST API and the certification facade.

pub mod builder;
pub mod endpoint;
pub mod error;
pub mod wire;

pub use builder::{BatchBuilder, TransactionBuilder};
pub use endpoint::{
    endpoints, BatchStatusEntry, BatchStatusList, CertifyRequest, CertifyResponse, ErrorCode,
    FailureResponse, HealthResponse, InvalidTransactionEntry, StateResponse,
    SubmitBatchesResponse, OCTET_STREAM,
};
pub use error::{ProtocolError, ProtocolResult};
pub use wire::{Batch, BatchHeader, BatchList, Transaction, TransactionHeader};
