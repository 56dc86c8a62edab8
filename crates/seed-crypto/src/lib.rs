//! Cryptographic primitives for SeedLedger.
//!
//! Provides secp256k1 ECDSA signing/verification over hex-encoded inputs,
//! an injectable signer registry, and the SHA-2 digests used for payload
//! hashes and seed fingerprints.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod digest;
pub mod error;
pub mod registry;
pub mod signer;
pub mod verifier;

pub use digest::{seed_fingerprint, sha256_hex, sha512_hex};
pub use error::SignerError;
pub use registry::{
    sign_hash, InMemorySignerRegistry, SignedHash, SignerIdentity, SignerRegistry, SignerSummary,
};
pub use signer::Signer;
pub use verifier::{verify, verify_message};
