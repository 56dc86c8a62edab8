use std::time::Duration;

use seed_protocol::{Batch, BatchList};
use seed_types::{AddressCodec, BatchStatus, Record};
use tokio::time::Instant;

use crate::api::LedgerApi;
use crate::config::SubmissionConfig;
use crate::error::{SyncError, SyncResult};

/// How a commit wait ended without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// No terminal status within the deadline. The batch may still commit.
    TimedOut,
}

impl CommitOutcome {
    pub fn is_committed(self) -> bool {
        self == Self::Committed
    }
}

/// Submits batches to one ledger and waits for them to reach a terminal status.
pub struct SubmissionClient<A> {
    api: A,
    codec: AddressCodec,
    config: SubmissionConfig,
}

impl<A: LedgerApi> SubmissionClient<A> {
    pub fn new(api: A, config: SubmissionConfig) -> Self {
        Self {
            api,
            codec: AddressCodec::seed(),
            config,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// Post `batch` wrapped in a batch list. Returns the batch id.
    pub async fn submit(&self, batch: &Batch) -> SyncResult<String> {
        let batch_id = batch.id().to_string();
        let bytes = BatchList::single(batch.clone()).to_bytes();
        self.api.submit_batches(bytes).await?;
        tracing::info!(batch_id = %short(&batch_id), "batch submitted");
        Ok(batch_id)
    }

    /// Poll the batch status until it is terminal or `timeout` elapses.
    ///
    /// Failed or non-200 status checks are logged and retried. `INVALID`
    /// ends the wait with [`SyncError::TransactionRejected`].
    pub async fn await_commit(
        &self,
        batch_id: &str,
        timeout: Duration,
    ) -> SyncResult<CommitOutcome> {
        let deadline = Instant::now() + timeout;
        let mut polls = 0u32;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            polls += 1;
            let request_timeout = self.config.status_request_timeout().min(remaining);
            let status = tokio::time::timeout(
                request_timeout,
                self.api.batch_status(batch_id, request_timeout),
            )
            .await;
            match status {
                Ok(Ok(list)) => match list.first_status() {
                    BatchStatus::Committed => {
                        tracing::info!(batch_id = %short(batch_id), polls, "batch committed");
                        return Ok(CommitOutcome::Committed);
                    }
                    BatchStatus::Invalid => {
                        let reason = list
                            .rejection_reason()
                            .unwrap_or_else(|| "batch marked invalid".to_string());
                        tracing::warn!(batch_id = %short(batch_id), %reason, "batch rejected");
                        return Err(SyncError::TransactionRejected(format!(
                            "batch {}: {reason}",
                            short(batch_id)
                        )));
                    }
                    other => {
                        tracing::debug!(
                            batch_id = %short(batch_id),
                            status = %other,
                            "batch not final"
                        );
                    }
                },
                Ok(Err(e)) => {
                    tracing::warn!(batch_id = %short(batch_id), error = %e, "status check failed");
                }
                Err(_) => {
                    tracing::warn!(batch_id = %short(batch_id), "status check timed out");
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            tokio::time::sleep(self.config.poll_interval().min(remaining)).await;
        }
        tracing::warn!(
            batch_id = %short(batch_id),
            timeout_ms = timeout.as_millis() as u64,
            "no terminal status before deadline"
        );
        Ok(CommitOutcome::TimedOut)
    }

    /// Submit, then wait up to the configured commit timeout.
    pub async fn submit_and_wait(&self, batch: &Batch) -> SyncResult<(String, CommitOutcome)> {
        let batch_id = self.submit(batch).await?;
        let outcome = self
            .await_commit(&batch_id, self.config.commit_timeout())
            .await?;
        Ok((batch_id, outcome))
    }

    /// Read a seed record straight from ledger state.
    pub async fn fetch_record(&self, record_id: &str) -> SyncResult<Option<Record>> {
        let address = self.codec.address(record_id);
        match self.api.fetch_state(&address).await? {
            Some(bytes) => Ok(Some(
                Record::from_bytes(&bytes).map_err(|e| SyncError::Decode(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }
}

fn short(id: &str) -> &str {
    &id[..id.len().min(16)]
}
