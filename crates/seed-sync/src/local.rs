use std::time::Duration;

use async_trait::async_trait;
use seed_ledger::InMemoryLedger;
use seed_protocol::BatchStatusList;
use seed_types::Address;

use crate::api::LedgerApi;
use crate::error::{SyncError, SyncResult};

/// In-process ledger, for tests and single-binary deployments.
#[async_trait]
impl LedgerApi for InMemoryLedger {
    async fn submit_batches(&self, batch_list: Vec<u8>) -> SyncResult<()> {
        self.submit(&batch_list)
            .map(|_| ())
            .map_err(|e| SyncError::SubmissionFailed(e.to_string()))
    }

    async fn batch_status(
        &self,
        batch_id: &str,
        _timeout: Duration,
    ) -> SyncResult<BatchStatusList> {
        let outcome = self.batch_outcome(batch_id)?;
        Ok(BatchStatusList {
            data: vec![outcome.to_status_entry(batch_id)],
        })
    }

    async fn fetch_state(&self, address: &Address) -> SyncResult<Option<Vec<u8>>> {
        Ok(self.state(address.as_str())?)
    }
}
