use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use seed_crypto::{seed_fingerprint, sign_hash, SignerRegistry};
use seed_protocol::CertifyRequest;
use seed_sync::{MultiBackendCertifier, VerificationReport};
use serde::{Deserialize, Serialize};

use crate::detection::{Detection, InferenceProvider, InferenceResult};
use crate::error::{SdkError, SdkResult};
use crate::repository::{SeedImage, SeedRepository};

/// Largest cosine distance at which a detection matches a stored seed.
pub const SIMILARITY_THRESHOLD: f64 = 0.1;

/// Largest cosine distance at which an upload counts as already registered.
pub const DUPLICATE_THRESHOLD: f64 = 0.01;

/// Outcome of [`SeedCertificationService::certify_seed`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationResult {
    pub seed_id: u64,
    pub transaction_id: String,
    pub backend_type: String,
    pub committed: bool,
    pub signer_name: String,
}

/// What happened to one detection on upload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Registration {
    Saved { seed_id: u64 },
    Duplicate { existing_seed_id: u64 },
    /// No cropped image to store.
    Skipped,
}

/// Verification result for one detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DetectionVerification {
    /// No stored seed is similar enough.
    NotFound {
        class_name: Option<String>,
        confidence: Option<f64>,
    },
    Matched {
        seed_id: u64,
        class_name: Option<String>,
        similarity: f64,
        report: VerificationReport,
    },
}

/// Registers, certifies, and verifies seeds.
pub struct SeedCertificationService {
    repository: Arc<dyn SeedRepository>,
    signers: Arc<dyn SignerRegistry>,
    certifier: Arc<MultiBackendCertifier>,
    inference: Option<Arc<dyn InferenceProvider>>,
}

impl SeedCertificationService {
    pub fn new(
        repository: Arc<dyn SeedRepository>,
        signers: Arc<dyn SignerRegistry>,
        certifier: Arc<MultiBackendCertifier>,
    ) -> Self {
        Self {
            repository,
            signers,
            certifier,
            inference: None,
        }
    }

    pub fn with_inference(mut self, inference: Arc<dyn InferenceProvider>) -> Self {
        self.inference = Some(inference);
        self
    }

    fn inference(&self) -> SdkResult<&Arc<dyn InferenceProvider>> {
        self.inference
            .as_ref()
            .ok_or_else(|| SdkError::Inference("no inference provider configured".into()))
    }

    /// Store every new detection that carries a cropped image.
    pub async fn register_detections(
        &self,
        result: &InferenceResult,
    ) -> SdkResult<Vec<Registration>> {
        let mut registrations = Vec::with_capacity(result.detections.len());
        for detection in &result.detections {
            if let Some(embedding) = &detection.embedding {
                if let Some((existing, _)) = self
                    .repository
                    .find_similar(embedding, DUPLICATE_THRESHOLD)
                    .await?
                {
                    registrations.push(Registration::Duplicate {
                        existing_seed_id: existing.id,
                    });
                    continue;
                }
            }
            if detection.cropped_image.is_none() {
                registrations.push(Registration::Skipped);
                continue;
            }
            let seed = SeedImage {
                prediction: detection.class_name.clone(),
                confidence: detection.confidence,
                quality: detection.quality.clone(),
                embedding: detection.embedding.clone(),
                bbox: detection.bbox,
                cropped_image: detection.cropped_image.clone(),
                ..SeedImage::new()
            };
            let seed_id = self.repository.save(seed).await?;
            registrations.push(Registration::Saved { seed_id });
        }
        Ok(registrations)
    }

    /// Run inference on `image` and register the detections.
    pub async fn upload_image(&self, image: &[u8]) -> SdkResult<Vec<Registration>> {
        let result = self.inference()?.detect(image).await?;
        self.register_detections(&result).await
    }

    /// Certify a stored seed, signing its fingerprint as `signer_id`.
    ///
    /// The ledger receipt is written back to the seed.
    pub async fn certify_seed(
        &self,
        seed_id: u64,
        primary: &str,
        signer_id: &str,
    ) -> SdkResult<CertificationResult> {
        let mut seed = self
            .repository
            .find_by_id(seed_id)
            .await?
            .ok_or(SdkError::SeedNotFound(seed_id))?;
        let class_name = seed.prediction.clone().ok_or(SdkError::IncompleteSeed {
            seed_id,
            field: "prediction",
        })?;
        let confidence = seed.confidence.ok_or(SdkError::IncompleteSeed {
            seed_id,
            field: "confidence",
        })?;

        let hash = seed_fingerprint(
            seed.embedding.as_deref().unwrap_or_default(),
            Some(confidence),
            seed.quality.as_deref(),
        );
        let signed = sign_hash(self.signers.as_ref(), &hash, signer_id)?;
        let request = CertifyRequest {
            record_id: seed_id.to_string(),
            class_name,
            hash,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            signature: Some(signed.signature),
            public_key: Some(signed.public_key),
            signer_name: Some(signed.signer_name.clone()),
        };

        let receipt = self.certifier.certify(primary, &request).await?;
        seed.blockchain_tx_id = Some(receipt.transaction_id.clone());
        seed.blockchain_type = Some(receipt.backend_type.clone());
        seed.signer_name = Some(signed.signer_name.clone());
        self.repository.save(seed).await?;

        tracing::info!(
            seed_id,
            backend = %receipt.backend_type,
            committed = receipt.committed,
            "seed certified"
        );
        Ok(CertificationResult {
            seed_id,
            transaction_id: receipt.transaction_id,
            backend_type: receipt.backend_type,
            committed: receipt.committed,
            signer_name: signed.signer_name,
        })
    }

    /// Match a detection to a stored seed and check every ledger for it.
    ///
    /// Returns `None` for detections without an embedding.
    pub async fn verify_detection(
        &self,
        detection: &Detection,
    ) -> SdkResult<Option<DetectionVerification>> {
        let Some(embedding) = detection.embedding.as_deref() else {
            return Ok(None);
        };
        let Some((seed, distance)) = self
            .repository
            .find_similar(embedding, SIMILARITY_THRESHOLD)
            .await?
        else {
            return Ok(Some(DetectionVerification::NotFound {
                class_name: detection.class_name.clone(),
                confidence: detection.confidence,
            }));
        };

        let hash = seed_fingerprint(
            embedding,
            detection.confidence,
            detection.quality.as_deref(),
        );
        let report = self.certifier.verify_all(&seed.id.to_string(), &hash).await;
        tracing::info!(seed_id = seed.id, status = ?report.status, "detection verified");
        Ok(Some(DetectionVerification::Matched {
            seed_id: seed.id,
            class_name: seed.prediction,
            similarity: 1.0 - distance,
            report,
        }))
    }

    /// Run inference on `image` and verify every detection with an embedding.
    pub async fn verify_image(&self, image: &[u8]) -> SdkResult<Vec<DetectionVerification>> {
        let result = self.inference()?.detect(image).await?;
        let mut verifications = Vec::new();
        for detection in &result.detections {
            if let Some(v) = self.verify_detection(detection).await? {
                verifications.push(v);
            }
        }
        Ok(verifications)
    }
}
