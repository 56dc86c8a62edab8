//! Client side of SeedLedger.
//!
//! Submits signed batches to a ledger, polls for finality, and certifies
//! records across an ordered list of backends. A backend that fails
//! outright is skipped in favor of the next one; a ledger-side rejection
//! is final and is never retried elsewhere.

pub mod api;
pub mod backend;
pub mod certifier;
pub mod client;
pub mod config;
pub mod error;
mod local;

pub use api::{LedgerApi, RestLedgerApi};
pub use backend::{CertificationBackend, CertifyReceipt, HttpBackend, LedgerBackend};
pub use certifier::{
    BackendVerification, MultiBackendCertifier, VerificationReport, VerificationStatus,
};
pub use client::{CommitOutcome, SubmissionClient};
pub use config::{BackendEndpoint, CertifierConfig, SubmissionConfig};
pub use error::{SyncError, SyncResult};
