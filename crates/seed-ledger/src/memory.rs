use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use seed_protocol::{
    Batch, BatchList, BatchStatusEntry, InvalidTransactionEntry, Transaction, TransactionHeader,
};
use seed_types::{AddressCodec, BatchStatus, Record};

use crate::context::ScratchContext;
use crate::error::LedgerError;
use crate::handler::{SeedTransactionHandler, TransactionHandler, TransactionRequest};

/// Result of processing one batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchOutcome {
    pub status: BatchStatus,
    /// `(transaction id, message)` for the transaction that failed, if any.
    pub invalid_transactions: Vec<(String, String)>,
}

impl BatchOutcome {
    fn with_status(status: BatchStatus) -> Self {
        Self {
            status,
            invalid_transactions: Vec::new(),
        }
    }

    /// Entry as served by `GET /batch_statuses`.
    pub fn to_status_entry(&self, batch_id: &str) -> BatchStatusEntry {
        BatchStatusEntry {
            id: batch_id.to_string(),
            status: self.status,
            invalid_transactions: self
                .invalid_transactions
                .iter()
                .map(|(id, message)| InvalidTransactionEntry {
                    id: id.clone(),
                    message: message.clone(),
                })
                .collect(),
        }
    }
}

/// In-memory ledger runtime for tests, local demos, and the development
/// validator.
///
/// Submitted batches are checked structurally (signatures, payload hashes,
/// transaction ordering) and rejected outright if malformed. Accepted
/// batches are applied atomically: either every transaction's writes are
/// committed or none are, and the batch is marked `INVALID`.
pub struct InMemoryLedger {
    handlers: Vec<Arc<dyn TransactionHandler>>,
    manual_commit: bool,
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    state: BTreeMap<String, Vec<u8>>,
    outcomes: HashMap<String, BatchOutcome>,
    queue: VecDeque<Batch>,
}

impl InMemoryLedger {
    pub fn new(handlers: Vec<Arc<dyn TransactionHandler>>) -> Self {
        Self {
            handlers,
            manual_commit: false,
            inner: RwLock::new(LedgerState::default()),
        }
    }

    /// Ledger running only the seed handler.
    pub fn with_handler(handler: SeedTransactionHandler) -> Self {
        let handler: Arc<dyn TransactionHandler> = Arc::new(handler);
        Self::new(vec![handler])
    }

    /// Keep accepted batches `PENDING` until [`process_pending`](Self::process_pending).
    pub fn manual_commit(mut self) -> Self {
        self.manual_commit = true;
        self
    }

    /// Accept a serialized batch list, returning the ids of its batches.
    pub fn submit(&self, batch_list: &[u8]) -> Result<Vec<String>, LedgerError> {
        let list = BatchList::from_bytes(batch_list)?;
        if list.batches.is_empty() {
            return Err(LedgerError::InvalidBatch("batch list is empty".into()));
        }
        for batch in &list.batches {
            check_batch(batch)?;
        }

        let ids: Vec<String> = list.batches.iter().map(|b| b.id().to_string()).collect();
        {
            let mut inner = self.write()?;
            for batch in list.batches {
                inner.outcomes.insert(
                    batch.id().to_string(),
                    BatchOutcome::with_status(BatchStatus::Pending),
                );
                inner.queue.push_back(batch);
            }
        }
        if !self.manual_commit {
            self.process_pending()?;
        }
        Ok(ids)
    }

    /// Apply every queued batch in submission order. Returns how many were processed.
    pub fn process_pending(&self) -> Result<usize, LedgerError> {
        let mut inner = self.write()?;
        let mut processed = 0;
        while let Some(batch) = inner.queue.pop_front() {
            let outcome = self.apply_batch(&mut inner.state, &batch);
            match outcome.status {
                BatchStatus::Committed => {
                    tracing::info!(batch_id = %short(batch.id()), "batch committed");
                }
                _ => tracing::warn!(
                    batch_id = %short(batch.id()),
                    reason = ?outcome.invalid_transactions,
                    "batch invalid"
                ),
            }
            inner.outcomes.insert(batch.id().to_string(), outcome);
            processed += 1;
        }
        Ok(processed)
    }

    fn apply_batch(&self, state: &mut BTreeMap<String, Vec<u8>>, batch: &Batch) -> BatchOutcome {
        let mut staged = BTreeMap::new();
        for txn in &batch.transactions {
            let rejection = match txn.decode_header() {
                Ok(header) => self.apply_transaction(state, &mut staged, &header, txn),
                Err(e) => Err(e.to_string()),
            };
            if let Err(message) = rejection {
                return BatchOutcome {
                    status: BatchStatus::Invalid,
                    invalid_transactions: vec![(txn.id().to_string(), message)],
                };
            }
        }
        state.extend(staged);
        BatchOutcome::with_status(BatchStatus::Committed)
    }

    fn apply_transaction(
        &self,
        state: &BTreeMap<String, Vec<u8>>,
        staged: &mut BTreeMap<String, Vec<u8>>,
        header: &TransactionHeader,
        txn: &Transaction,
    ) -> Result<(), String> {
        let handler = self
            .handler_for(header)
            .ok_or_else(|| {
                format!(
                    "no handler for family {} {}",
                    header.family_name, header.family_version
                )
            })?;
        // writes of a failed transaction must not leak into the batch
        let mut scratch = staged.clone();
        let mut context = ScratchContext::new(state, &mut scratch, &header.inputs, &header.outputs);
        let request = TransactionRequest {
            header,
            signature: txn.id(),
            payload: &txn.payload,
        };
        handler
            .apply(&request, &mut context)
            .map_err(|e| e.to_string())?;
        *staged = scratch;
        Ok(())
    }

    fn handler_for(&self, header: &TransactionHeader) -> Option<&Arc<dyn TransactionHandler>> {
        self.handlers.iter().find(|h| {
            h.family_name() == header.family_name
                && h.family_versions().iter().any(|v| *v == header.family_version)
        })
    }

    /// Status of a batch; ids never submitted are `UNKNOWN`.
    pub fn batch_outcome(&self, batch_id: &str) -> Result<BatchOutcome, LedgerError> {
        Ok(self
            .read()?
            .outcomes
            .get(batch_id)
            .cloned()
            .unwrap_or_else(|| BatchOutcome::with_status(BatchStatus::Unknown)))
    }

    /// Raw value stored at `address`.
    pub fn state(&self, address: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.read()?.state.get(address).cloned())
    }

    /// Decoded seed record stored for `record_id`.
    pub fn record(&self, record_id: &str) -> Result<Option<Record>, LedgerError> {
        let address = AddressCodec::seed().address(record_id);
        self.state(address.as_str())?
            .map(|bytes| {
                Record::from_bytes(&bytes).map_err(|e| LedgerError::CorruptRecord(e.to_string()))
            })
            .transpose()
    }

    /// Number of populated addresses.
    pub fn state_len(&self) -> Result<usize, LedgerError> {
        Ok(self.read()?.state.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, LedgerState>, LedgerError> {
        self.inner.read().map_err(|_| LedgerError::LockPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, LedgerError> {
        self.inner.write().map_err(|_| LedgerError::LockPoisoned)
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::with_handler(SeedTransactionHandler::default())
    }
}

/// Structural checks a validator performs before accepting a batch.
fn check_batch(batch: &Batch) -> Result<(), LedgerError> {
    let invalid =
        |reason: String| LedgerError::InvalidBatch(format!("{}: {reason}", short(batch.id())));

    let header = batch.decode_header()?;
    if !seed_crypto::verify_message(&batch.header, batch.id(), &header.signer_public_key) {
        return Err(invalid("batch header signature does not verify".into()));
    }
    if batch.transactions.is_empty() {
        return Err(invalid("batch has no transactions".into()));
    }
    let ids: Vec<&str> = batch.transactions.iter().map(|t| t.id()).collect();
    if header.transaction_ids.iter().map(String::as_str).ne(ids.iter().copied()) {
        return Err(invalid("transaction ids do not match batch header".into()));
    }

    for txn in &batch.transactions {
        let txn_header = txn.decode_header()?;
        if !seed_crypto::verify_message(&txn.header, txn.id(), &txn_header.signer_public_key) {
            return Err(invalid(format!(
                "transaction {} header signature does not verify",
                short(txn.id())
            )));
        }
        if txn_header.batcher_public_key != header.signer_public_key {
            return Err(invalid(format!(
                "transaction {} was not batched by its declared batcher",
                short(txn.id())
            )));
        }
        if txn_header.payload_sha512 != seed_crypto::sha512_hex(&txn.payload) {
            return Err(invalid(format!(
                "transaction {} payload hash mismatch",
                short(txn.id())
            )));
        }
    }
    Ok(())
}

fn short(id: &str) -> &str {
    &id[..id.len().min(16)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use seed_crypto::{sha256_hex, Signer};
    use seed_protocol::{BatchBuilder, TransactionBuilder};
    use seed_types::{CreateRecord, SeedAction};
    use std::sync::Barrier;

    fn create(record_id: &str) -> SeedAction {
        SeedAction::Create(CreateRecord {
            record_id: record_id.into(),
            class_name: "palm".into(),
            hash: sha256_hex(record_id.as_bytes()),
            timestamp: "2026-01-01T00:00:00Z".into(),
            ..Default::default()
        })
    }

    fn batch_of(actions: &[SeedAction], signer: &Signer) -> Batch {
        let builder = TransactionBuilder::seed();
        let codec = AddressCodec::seed();
        let txns = actions
            .iter()
            .map(|a| builder.seed_action(a, &codec, signer).unwrap())
            .collect();
        BatchBuilder::build(txns, signer)
    }

    fn submit(ledger: &InMemoryLedger, batch: Batch) -> Result<String, LedgerError> {
        let bytes = BatchList::single(batch).to_bytes();
        Ok(ledger.submit(&bytes)?.remove(0))
    }

    #[test]
    fn commits_valid_batch() {
        let ledger = InMemoryLedger::default();
        let signer = Signer::generate();
        let id = submit(&ledger, batch_of(&[create("seed-42")], &signer)).unwrap();
        assert_eq!(ledger.batch_outcome(&id).unwrap().status, BatchStatus::Committed);
        let record = ledger.record("seed-42").unwrap().unwrap();
        assert_eq!(record.class_name, "palm");
    }

    #[test]
    fn creator_tx_id_is_transaction_signature() {
        let ledger = InMemoryLedger::default();
        let signer = Signer::generate();
        let batch = batch_of(&[create("s1")], &signer);
        let txn_id = batch.transactions[0].id().to_string();
        submit(&ledger, batch).unwrap();
        assert_eq!(ledger.record("s1").unwrap().unwrap().creator_tx_id, txn_id);
    }

    #[test]
    fn duplicate_create_marks_batch_invalid() {
        let ledger = InMemoryLedger::default();
        let signer = Signer::generate();
        submit(&ledger, batch_of(&[create("s1")], &signer)).unwrap();
        let id = submit(&ledger, batch_of(&[create("s1")], &signer)).unwrap();
        let outcome = ledger.batch_outcome(&id).unwrap();
        assert_eq!(outcome.status, BatchStatus::Invalid);
        assert!(outcome.invalid_transactions[0].1.contains("already exists"));

        let entry = outcome.to_status_entry(&id);
        assert_eq!(entry.id, id);
        assert_eq!(entry.invalid_transactions.len(), 1);
    }

    #[test]
    fn batches_are_atomic() {
        let ledger = InMemoryLedger::default();
        let signer = Signer::generate();
        let id = submit(
            &ledger,
            batch_of(&[create("a"), create("b"), SeedAction::get("missing")], &signer),
        )
        .unwrap();
        assert_eq!(ledger.batch_outcome(&id).unwrap().status, BatchStatus::Invalid);
        assert_eq!(ledger.state_len().unwrap(), 0);
        assert!(ledger.record("a").unwrap().is_none());
    }

    #[test]
    fn later_transactions_see_earlier_writes() {
        let ledger = InMemoryLedger::default();
        let signer = Signer::generate();
        let id = submit(&ledger, batch_of(&[create("a"), SeedAction::get("a")], &signer)).unwrap();
        assert_eq!(ledger.batch_outcome(&id).unwrap().status, BatchStatus::Committed);
    }

    #[test]
    fn unknown_batch_id() {
        let ledger = InMemoryLedger::default();
        assert_eq!(
            ledger.batch_outcome("nope").unwrap().status,
            BatchStatus::Unknown
        );
    }

    #[test]
    fn rejects_tampered_batches_at_submission() {
        let ledger = InMemoryLedger::default();
        let signer = Signer::generate();

        let mut batch = batch_of(&[create("s1")], &signer);
        batch.transactions[0].payload = b"{}".to_vec();
        assert!(matches!(
            submit(&ledger, batch),
            Err(LedgerError::InvalidBatch(m)) if m.contains("payload hash")
        ));

        let mut batch = batch_of(&[create("s1")], &signer);
        batch.header_signature = Signer::generate().sign(&batch.header);
        assert!(matches!(submit(&ledger, batch), Err(LedgerError::InvalidBatch(_))));

        let a = batch_of(&[create("a")], &signer);
        let mut b = batch_of(&[create("b")], &signer);
        b.transactions = a.transactions;
        assert!(matches!(
            submit(&ledger, b),
            Err(LedgerError::InvalidBatch(m)) if m.contains("transaction ids")
        ));

        assert!(matches!(ledger.submit(&[0xff, 0xff]), Err(LedgerError::Decode(_))));
        assert!(matches!(ledger.submit(&[]), Err(LedgerError::InvalidBatch(_))));
        assert_eq!(ledger.state_len().unwrap(), 0);
    }

    #[test]
    fn foreign_batcher_rejected() {
        let ledger = InMemoryLedger::default();
        let txn_signer = Signer::generate();
        let batcher = Signer::generate();
        let txn = TransactionBuilder::seed()
            .seed_action(&create("s1"), &AddressCodec::seed(), &txn_signer)
            .unwrap();
        let batch = BatchBuilder::build(vec![txn], &batcher);
        assert!(matches!(
            submit(&ledger, batch),
            Err(LedgerError::InvalidBatch(m)) if m.contains("batcher")
        ));
    }

    #[test]
    fn unknown_family_is_invalid() {
        let ledger = InMemoryLedger::default();
        let signer = Signer::generate();
        let txn = TransactionBuilder::new("intkey", "1.0").build(b"x".to_vec(), &[], &[], &signer);
        let id = submit(&ledger, BatchBuilder::build(vec![txn], &signer)).unwrap();
        let outcome = ledger.batch_outcome(&id).unwrap();
        assert_eq!(outcome.status, BatchStatus::Invalid);
        assert!(outcome.invalid_transactions[0].1.contains("no handler"));
    }

    #[test]
    fn manual_commit_stays_pending() {
        let ledger = InMemoryLedger::default().manual_commit();
        let signer = Signer::generate();
        let id = submit(&ledger, batch_of(&[create("s1")], &signer)).unwrap();
        assert_eq!(ledger.batch_outcome(&id).unwrap().status, BatchStatus::Pending);
        assert!(ledger.record("s1").unwrap().is_none());

        assert_eq!(ledger.process_pending().unwrap(), 1);
        assert_eq!(ledger.batch_outcome(&id).unwrap().status, BatchStatus::Committed);
    }

    #[test]
    fn concurrent_creates_for_one_address_commit_once() {
        let ledger = Arc::new(InMemoryLedger::default());
        let barrier = Arc::new(Barrier::new(4));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ledger = Arc::clone(&ledger);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    let signer = Signer::generate();
                    let batch = batch_of(&[create("contested")], &signer);
                    barrier.wait();
                    let id = submit(&ledger, batch).unwrap();
                    ledger.batch_outcome(&id).unwrap().status
                })
            })
            .collect();
        let statuses: Vec<BatchStatus> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let committed = statuses.iter().filter(|s| **s == BatchStatus::Committed).count();
        assert_eq!(committed, 1);
        assert_eq!(statuses.len() - committed, 3);
    }
}
