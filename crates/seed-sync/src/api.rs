use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use seed_protocol::{endpoints, BatchStatusList, StateResponse, OCTET_STREAM};
use seed_types::Address;

use crate::config::SubmissionConfig;
use crate::error::{SyncError, SyncResult};

/// The validator REST surface a submission client talks to.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// Post a serialized batch list. Any non-2xx answer is `SubmissionFailed`.
    async fn submit_batches(&self, batch_list: Vec<u8>) -> SyncResult<()>;

    /// One status lookup, bounded by `timeout`.
    async fn batch_status(&self, batch_id: &str, timeout: Duration) -> SyncResult<BatchStatusList>;

    /// Raw value stored at `address`, `None` if absent.
    async fn fetch_state(&self, address: &Address) -> SyncResult<Option<Vec<u8>>>;
}

#[async_trait]
impl<T: LedgerApi + ?Sized> LedgerApi for Arc<T> {
    async fn submit_batches(&self, batch_list: Vec<u8>) -> SyncResult<()> {
        (**self).submit_batches(batch_list).await
    }

    async fn batch_status(&self, batch_id: &str, timeout: Duration) -> SyncResult<BatchStatusList> {
        (**self).batch_status(batch_id, timeout).await
    }

    async fn fetch_state(&self, address: &Address) -> SyncResult<Option<Vec<u8>>> {
        (**self).fetch_state(address).await
    }
}

/// [`LedgerApi`] over a validator's HTTP REST API.
#[derive(Clone, Debug)]
pub struct RestLedgerApi {
    base_url: String,
    http: reqwest::Client,
}

impl RestLedgerApi {
    pub fn new(base_url: impl Into<String>, config: &SubmissionConfig) -> SyncResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.submit_timeout())
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl LedgerApi for RestLedgerApi {
    async fn submit_batches(&self, batch_list: Vec<u8>) -> SyncResult<()> {
        let response = self
            .http
            .post(self.url(endpoints::BATCHES))
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(batch_list)
            .send()
            .await
            .map_err(|e| SyncError::SubmissionFailed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::SubmissionFailed(format!("{status}: {body}")));
        }
        Ok(())
    }

    async fn batch_status(&self, batch_id: &str, timeout: Duration) -> SyncResult<BatchStatusList> {
        let response = self
            .http
            .get(self.url(endpoints::BATCH_STATUSES))
            .query(&[("id", batch_id)])
            .timeout(timeout)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(unexpected(response).await);
        }
        Ok(response.json().await?)
    }

    async fn fetch_state(&self, address: &Address) -> SyncResult<Option<Vec<u8>>> {
        let response = self
            .http
            .get(self.url(&format!("{}/{}", endpoints::STATE, address)))
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => {
                let body: StateResponse = response.json().await?;
                Ok(Some(body.decode_data()?))
            }
            _ => Err(unexpected(response).await),
        }
    }
}

async fn unexpected(response: reqwest::Response) -> SyncError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    SyncError::UnexpectedStatus { status, body }
}
