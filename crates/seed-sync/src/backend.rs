use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use seed_crypto::Signer;
use seed_protocol::{
    endpoints, BatchBuilder, CertifyRequest, CertifyResponse, ErrorCode, FailureResponse,
    TransactionBuilder,
};
use seed_types::{AddressCodec, Record, SeedAction};
use serde::{Deserialize, Serialize};

use crate::api::LedgerApi;
use crate::client::SubmissionClient;
use crate::error::{SyncError, SyncResult};

/// Result of a successful certification on one backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifyReceipt {
    pub transaction_id: String,
    pub backend_type: String,
    /// `false` when the batch was accepted but not confirmed in time.
    pub committed: bool,
}

/// A ledger that can certify and look up seed records.
#[async_trait]
pub trait CertificationBackend: Send + Sync {
    /// Name used to select the backend, e.g. `"sawtooth"`.
    fn name(&self) -> &str;

    async fn certify(&self, request: &CertifyRequest) -> SyncResult<CertifyReceipt>;

    async fn fetch_record(&self, record_id: &str) -> SyncResult<Option<Record>>;
}

/// Backend that builds, signs, and submits batches itself.
pub struct LedgerBackend<A> {
    name: String,
    signer: Signer,
    codec: AddressCodec,
    builder: TransactionBuilder,
    client: SubmissionClient<A>,
}

impl<A: LedgerApi> LedgerBackend<A> {
    pub fn new(name: impl Into<String>, signer: Signer, client: SubmissionClient<A>) -> Self {
        Self {
            name: name.into(),
            signer,
            codec: AddressCodec::seed(),
            builder: TransactionBuilder::seed(),
            client,
        }
    }

    pub fn client(&self) -> &SubmissionClient<A> {
        &self.client
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }
}

#[async_trait]
impl<A: LedgerApi> CertificationBackend for LedgerBackend<A> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn certify(&self, request: &CertifyRequest) -> SyncResult<CertifyReceipt> {
        let action = SeedAction::Create(request.clone());
        action.validate()?;
        let txn = self.builder.seed_action(&action, &self.codec, &self.signer)?;
        let transaction_id = txn.id().to_string();
        let batch = BatchBuilder::build(vec![txn], &self.signer);

        let (_, outcome) = self.client.submit_and_wait(&batch).await?;
        Ok(CertifyReceipt {
            transaction_id,
            backend_type: self.name.clone(),
            committed: outcome.is_committed(),
        })
    }

    async fn fetch_record(&self, record_id: &str) -> SyncResult<Option<Record>> {
        self.client.fetch_record(record_id).await
    }
}

/// Backend reached through another deployment's certification facade.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    name: String,
    base_url: String,
    http: reqwest::Client,
}

impl HttpBackend {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> SyncResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl CertificationBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn certify(&self, request: &CertifyRequest) -> SyncResult<CertifyReceipt> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, endpoints::CERTIFY))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            let body: CertifyResponse = response.json().await?;
            return Ok(CertifyReceipt {
                transaction_id: body.transaction_id,
                backend_type: self.name.clone(),
                committed: body.committed,
            });
        }

        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<FailureResponse>(&text) {
            Ok(failure) if failure.error == ErrorCode::TransactionRejected => {
                Err(SyncError::TransactionRejected(failure.message))
            }
            Ok(failure) => Err(SyncError::SubmissionFailed(format!(
                "{status}: {}",
                failure.message
            ))),
            Err(_) => Err(SyncError::SubmissionFailed(format!("{status}: {text}"))),
        }
    }

    async fn fetch_record(&self, record_id: &str) -> SyncResult<Option<Record>> {
        let response = self
            .http
            .get(format!("{}{}/{}", self.base_url, endpoints::VERIFY, record_id))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => {
                let text = response.text().await.unwrap_or_default();
                match serde_json::from_str::<FailureResponse>(&text) {
                    Ok(failure) if failure.error == ErrorCode::LookupFailed => {
                        Err(SyncError::UnexpectedStatus {
                            status: StatusCode::NOT_FOUND.as_u16(),
                            body: failure.message,
                        })
                    }
                    _ => Ok(None),
                }
            }
            s if s.is_success() => Ok(Some(response.json().await?)),
            s => Err(SyncError::UnexpectedStatus {
                status: s.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}
