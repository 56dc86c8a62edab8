//! Foundation types for SeedLedger.
//!
//! Every other SeedLedger crate depends on `seed-types`. Client and ledger
//! code share these definitions, so an address computed by the submitter is
//! byte-for-byte the address the transaction handler writes to.
//!
//! # Key Types
//!
//! - [`AddressCodec`]: Deterministic `recordId` to state address mapping
//! - [`Record`]: The attested fact stored on the ledger
//! - [`SeedAction`]: Transaction payload (`create` / `get`)
//! - [`BatchStatus`]: Ledger-reported lifecycle of a submitted batch

pub mod address;
pub mod error;
pub mod payload;
pub mod record;
pub mod status;

pub use address::{Address, AddressCodec, FAMILY_NAME, FAMILY_VERSION};
pub use error::TypeError;
pub use payload::{CreateRecord, SeedAction};
pub use record::{Record, RECORD_DOC_TYPE};
pub use status::BatchStatus;
