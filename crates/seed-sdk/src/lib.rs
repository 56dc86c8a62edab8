//! High-level SDK for SeedLedger.
//!
//! Ties the ledger client to the application's collaborators: an inference
//! provider that detects seeds in images and a repository that stores them.
//! [`SeedCertificationService`] is the main entry point.

pub mod detection;
pub mod error;
pub mod repository;
pub mod service;

pub use detection::{Detection, ImageSize, InferenceProvider, InferenceResult};
pub use error::{SdkError, SdkResult};
pub use repository::{cosine_distance, InMemorySeedRepository, SeedImage, SeedRepository};
pub use service::{
    CertificationResult, DetectionVerification, Registration, SeedCertificationService,
    DUPLICATE_THRESHOLD, SIMILARITY_THRESHOLD,
};

// Re-export key types
pub use seed_crypto::{InMemorySignerRegistry, SignerRegistry};
pub use seed_sync::{MultiBackendCertifier, VerificationReport, VerificationStatus};
pub use seed_types::Record;
