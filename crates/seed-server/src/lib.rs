//! HTTP surfaces for SeedLedger.
//!
//! Two routers live here: the certification facade that clients call
//! (`/certify`, `/verify/:record_id`, `/health`) and a development validator
//! that serves the ledger REST API over an in-memory ledger.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod validator;

pub use config::{ServerConfig, ValidatorConfig};
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use server::{DevValidator, SeedServer};
