//! Ledger-side logic for SeedLedger.
//!
//! This crate provides:
//! - The `TransactionContext` boundary through which handlers read and write state
//! - `TransactionHandler`, the contract a transaction family implements
//! - `SeedTransactionHandler`, the record state machine (`create` / `get`)
//! - `InMemoryLedger`, a runtime that validates, applies and tracks batches
//!   for tests, local demos, and the development validator

pub mod context;
pub mod error;
pub mod handler;
pub mod memory;

pub use context::{ScratchContext, TransactionContext};
pub use error::{ApplyError, ContextError, LedgerError};
pub use handler::{
    HandlerConfig, SeedTransactionHandler, TransactionHandler, TransactionRequest, UnsignedPolicy,
};
pub use memory::{BatchOutcome, InMemoryLedger};
