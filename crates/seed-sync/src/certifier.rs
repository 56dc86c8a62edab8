use std::sync::Arc;

use seed_protocol::CertifyRequest;
use serde::{Deserialize, Serialize};

use crate::backend::{CertificationBackend, CertifyReceipt, HttpBackend};
use crate::config::CertifierConfig;
use crate::error::{SyncError, SyncResult};

/// Overall verdict of a cross-backend verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Some backend stores the record with the expected hash.
    Certified,
    /// Some backend stores the record, none with the expected hash.
    FoundNotCertified,
    NoLedgerRecord,
}

/// What one backend reported for a record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendVerification {
    pub backend: String,
    pub found: bool,
    pub certified: bool,
    pub transaction_id: Option<String>,
    pub timestamp: Option<String>,
    pub signer_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub record_id: String,
    pub status: VerificationStatus,
    pub backends: Vec<BackendVerification>,
}

/// Certifies against an ordered list of backends, falling back on failure.
pub struct MultiBackendCertifier {
    backends: Vec<Arc<dyn CertificationBackend>>,
}

impl MultiBackendCertifier {
    pub fn new(backends: Vec<Arc<dyn CertificationBackend>>) -> Self {
        Self { backends }
    }

    /// One [`HttpBackend`] per configured endpoint, in configured order.
    pub fn from_config(config: &CertifierConfig) -> SyncResult<Self> {
        let backends = config
            .backends
            .iter()
            .map(|b| {
                HttpBackend::new(&b.name, &b.url, config.request_timeout())
                    .map(|h| Arc::new(h) as Arc<dyn CertificationBackend>)
            })
            .collect::<SyncResult<Vec<_>>>()?;
        Ok(Self::new(backends))
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Try `primary`, then every other backend in list order.
    ///
    /// Stops at the first success. A [`SyncError::TransactionRejected`] from
    /// any backend is returned immediately without trying the rest.
    pub async fn certify(
        &self,
        primary: &str,
        request: &CertifyRequest,
    ) -> SyncResult<CertifyReceipt> {
        let first = self
            .backends
            .iter()
            .position(|b| b.name() == primary)
            .ok_or_else(|| SyncError::UnknownBackend(primary.to_string()))?;
        let order = std::iter::once(first).chain((0..self.backends.len()).filter(|i| *i != first));

        let mut failures = Vec::new();
        for index in order {
            let backend = &self.backends[index];
            match backend.certify(request).await {
                Ok(receipt) => {
                    if !failures.is_empty() {
                        tracing::info!(
                            backend = backend.name(),
                            record_id = %request.record_id,
                            "certified on fallback backend"
                        );
                    }
                    return Ok(receipt);
                }
                Err(e) if !e.is_fallback_eligible() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        backend = backend.name(),
                        record_id = %request.record_id,
                        error = %e,
                        "certification failed, trying next backend"
                    );
                    failures.push(format!("{}: {e}", backend.name()));
                }
            }
        }
        Err(SyncError::AllBackendsFailed(failures))
    }

    /// Look the record up on every backend and compare stored hashes.
    ///
    /// Backend errors are logged and reported as not found.
    pub async fn verify_all(&self, record_id: &str, expected_hash: &str) -> VerificationReport {
        let mut backends = Vec::with_capacity(self.backends.len());
        for backend in &self.backends {
            let record = match backend.fetch_record(record_id).await {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(
                        backend = backend.name(),
                        record_id,
                        error = %e,
                        "lookup failed"
                    );
                    None
                }
            };
            backends.push(match record {
                Some(r) => BackendVerification {
                    backend: backend.name().to_string(),
                    found: true,
                    certified: r.hash == expected_hash,
                    transaction_id: Some(r.creator_tx_id),
                    timestamp: Some(r.timestamp),
                    signer_name: r.signer_name,
                },
                None => BackendVerification {
                    backend: backend.name().to_string(),
                    found: false,
                    certified: false,
                    transaction_id: None,
                    timestamp: None,
                    signer_name: None,
                },
            });
        }

        let status = if backends.iter().any(|b| b.certified) {
            VerificationStatus::Certified
        } else if backends.iter().any(|b| b.found) {
            VerificationStatus::FoundNotCertified
        } else {
            VerificationStatus::NoLedgerRecord
        };
        VerificationReport {
            record_id: record_id.to_string(),
            status,
            backends,
        }
    }
}
