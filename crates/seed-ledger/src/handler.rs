use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use seed_protocol::TransactionHeader;
use seed_types::{AddressCodec, CreateRecord, Record, SeedAction, FAMILY_VERSION};

use crate::context::TransactionContext;
use crate::error::ApplyError;

/// A transaction as presented to a handler.
pub struct TransactionRequest<'a> {
    pub header: &'a TransactionHeader,
    /// Transaction id (header signature).
    pub signature: &'a str,
    pub payload: &'a [u8],
}

/// Rules for one transaction family, dispatched by the ledger runtime.
pub trait TransactionHandler: Send + Sync {
    fn family_name(&self) -> &str;

    fn family_versions(&self) -> Vec<String>;

    fn namespaces(&self) -> Vec<String>;

    fn apply(
        &self,
        request: &TransactionRequest<'_>,
        context: &mut dyn TransactionContext,
    ) -> Result<(), ApplyError>;
}

/// What to do with a `create` that carries no signature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsignedPolicy {
    /// Store the record unsigned and log a warning.
    #[default]
    Accept,
    /// Reject the transaction.
    Reject,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerConfig {
    #[serde(default)]
    pub unsigned_policy: UnsignedPolicy,
}

/// Handler for the `seed` family.
///
/// Each record address moves from absent to present exactly once; there is
/// no update or delete path.
#[derive(Clone, Debug, Default)]
pub struct SeedTransactionHandler {
    codec: AddressCodec,
    config: HandlerConfig,
}

impl SeedTransactionHandler {
    pub fn new(config: HandlerConfig) -> Self {
        Self {
            codec: AddressCodec::seed(),
            config,
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    /// Apply a `create` or `get` payload submitted by transaction `caller_tx_id`.
    ///
    /// Returns the created or retrieved record. Nothing is written unless
    /// every check passes.
    pub fn apply_action(
        &self,
        payload: &[u8],
        caller_tx_id: &str,
        context: &mut dyn TransactionContext,
    ) -> Result<Record, ApplyError> {
        let action = SeedAction::from_bytes(payload)?;
        tracing::info!(
            action = action.name(),
            record_id = action.record_id(),
            "processing seed action"
        );
        match action {
            SeedAction::Create(create) => self.create(create, caller_tx_id, context),
            SeedAction::Get { record_id } => self.get(&record_id, context),
        }
    }

    fn create(
        &self,
        create: CreateRecord,
        caller_tx_id: &str,
        context: &mut dyn TransactionContext,
    ) -> Result<Record, ApplyError> {
        match create.signature_pair() {
            Some((signature, public_key)) => {
                if !seed_crypto::verify(&create.hash, signature, public_key) {
                    return Err(ApplyError::SignatureInvalid {
                        record_id: create.record_id,
                        reason: "signature does not verify against public key".into(),
                    });
                }
                tracing::info!(record_id = %create.record_id, "record signature verified");
            }
            None => match self.config.unsigned_policy {
                UnsignedPolicy::Accept => {
                    tracing::warn!(record_id = %create.record_id, "no signature provided");
                }
                UnsignedPolicy::Reject => {
                    return Err(ApplyError::SignatureInvalid {
                        record_id: create.record_id,
                        reason: "signature required".into(),
                    });
                }
            },
        }

        let address = self.codec.address(&create.record_id).to_string();
        let existing = context.get_state(std::slice::from_ref(&address))?;
        if existing.contains_key(&address) {
            return Err(ApplyError::AlreadyExists(create.record_id));
        }

        let record = create.into_record(caller_tx_id);
        let bytes = record.to_bytes()?;
        let set = context.set_state(HashMap::from([(address, bytes)]))?;
        if set.is_empty() {
            return Err(ApplyError::StateWriteFailed(record.record_id));
        }

        tracing::info!(record_id = %record.record_id, "created seed record");
        Ok(record)
    }

    fn get(
        &self,
        record_id: &str,
        context: &mut dyn TransactionContext,
    ) -> Result<Record, ApplyError> {
        let address = self.codec.address(record_id).to_string();
        let mut entries = context.get_state(std::slice::from_ref(&address))?;
        let bytes = entries
            .remove(&address)
            .ok_or_else(|| ApplyError::NotFound(record_id.to_string()))?;
        let record = Record::from_bytes(&bytes)?;
        tracing::info!(record_id, "retrieved seed record");
        Ok(record)
    }
}

impl TransactionHandler for SeedTransactionHandler {
    fn family_name(&self) -> &str {
        self.codec.family_name()
    }

    fn family_versions(&self) -> Vec<String> {
        vec![FAMILY_VERSION.to_string()]
    }

    fn namespaces(&self) -> Vec<String> {
        vec![self.codec.namespace().to_string()]
    }

    fn apply(
        &self,
        request: &TransactionRequest<'_>,
        context: &mut dyn TransactionContext,
    ) -> Result<(), ApplyError> {
        self.apply_action(request.payload, request.signature, context)
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ScratchContext;
    use crate::error::ContextError;
    use seed_crypto::{sha256_hex, Signer};
    use std::collections::BTreeMap;

    /// Context that accepts reads but refuses to report any write.
    struct DroppingContext;

    impl TransactionContext for DroppingContext {
        fn get_state(&self, _: &[String]) -> Result<HashMap<String, Vec<u8>>, ContextError> {
            Ok(HashMap::new())
        }

        fn set_state(
            &mut self,
            _: HashMap<String, Vec<u8>>,
        ) -> Result<Vec<String>, ContextError> {
            Ok(Vec::new())
        }
    }

    struct Harness {
        committed: BTreeMap<String, Vec<u8>>,
        declared: Vec<String>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                committed: BTreeMap::new(),
                declared: vec![AddressCodec::seed().namespace().to_string()],
            }
        }

        fn apply(
            &mut self,
            handler: &SeedTransactionHandler,
            action: &SeedAction,
        ) -> Result<Record, ApplyError> {
            let mut staged = BTreeMap::new();
            let mut ctx =
                ScratchContext::new(&self.committed, &mut staged, &self.declared, &self.declared);
            let result = handler.apply_action(&action.to_bytes().unwrap(), "tx-1", &mut ctx);
            drop(ctx);
            if result.is_ok() {
                self.committed.extend(staged);
            }
            result
        }
    }

    fn create(record_id: &str) -> CreateRecord {
        CreateRecord {
            record_id: record_id.into(),
            class_name: "palm".into(),
            hash: sha256_hex(record_id.as_bytes()),
            timestamp: "2026-01-01T00:00:00Z".into(),
            ..Default::default()
        }
    }

    fn signed(record_id: &str, signer: &Signer) -> CreateRecord {
        let mut c = create(record_id);
        c.signature = Some(signer.sign_hash(&c.hash).unwrap());
        c.public_key = Some(signer.public_key_hex().to_string());
        c
    }

    #[test]
    fn create_then_get() {
        let handler = SeedTransactionHandler::default();
        let mut h = Harness::new();
        let signer = Signer::generate();
        let created = h
            .apply(&handler, &SeedAction::Create(signed("seed-42", &signer)))
            .unwrap();
        assert_eq!(created.creator_tx_id, "tx-1");
        assert!(created.is_signed());

        let fetched = h.apply(&handler, &SeedAction::get("seed-42")).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn second_create_always_rejected() {
        let handler = SeedTransactionHandler::default();
        let mut h = Harness::new();
        h.apply(&handler, &SeedAction::Create(create("s1"))).unwrap();

        let mut different = create("s1");
        different.class_name = "oak".into();
        different.hash = sha256_hex(b"other");
        assert_eq!(
            h.apply(&handler, &SeedAction::Create(different)).unwrap_err(),
            ApplyError::AlreadyExists("s1".into())
        );
        assert_eq!(h.committed.len(), 1);
    }

    #[test]
    fn unsigned_accepted_by_default() {
        let handler = SeedTransactionHandler::default();
        let mut h = Harness::new();
        let record = h.apply(&handler, &SeedAction::Create(create("s1"))).unwrap();
        assert!(!record.is_signed());
    }

    #[test]
    fn unsigned_rejected_when_configured() {
        let handler = SeedTransactionHandler::new(HandlerConfig {
            unsigned_policy: UnsignedPolicy::Reject,
        });
        let mut h = Harness::new();
        let err = h
            .apply(&handler, &SeedAction::Create(create("s1")))
            .unwrap_err();
        assert!(matches!(err, ApplyError::SignatureInvalid { .. }));
        assert!(h.committed.is_empty());

        let signer = Signer::generate();
        h.apply(&handler, &SeedAction::Create(signed("s2", &signer)))
            .unwrap();
    }

    #[test]
    fn bad_signature_rejected_before_state_access() {
        let handler = SeedTransactionHandler::default();
        let mut h = Harness::new();
        let signer = Signer::generate();
        let mut c = signed("s1", &signer);
        c.public_key = Some(Signer::generate().public_key_hex().to_string());
        let err = h.apply(&handler, &SeedAction::Create(c)).unwrap_err();
        assert!(matches!(err, ApplyError::SignatureInvalid { record_id, .. } if record_id == "s1"));
        assert!(h.committed.is_empty());
    }

    #[test]
    fn signature_over_non_hex_hash_rejected() {
        let handler = SeedTransactionHandler::default();
        let mut h = Harness::new();
        let signer = Signer::generate();
        let mut c = signed("s1", &signer);
        c.hash = "not-hex".into();
        assert!(matches!(
            h.apply(&handler, &SeedAction::Create(c)),
            Err(ApplyError::SignatureInvalid { .. })
        ));
    }

    #[test]
    fn get_before_create_not_found() {
        let handler = SeedTransactionHandler::default();
        let mut h = Harness::new();
        assert_eq!(
            h.apply(&handler, &SeedAction::get("seed-x")).unwrap_err(),
            ApplyError::NotFound("seed-x".into())
        );
    }

    #[test]
    fn malformed_payloads_rejected() {
        let handler = SeedTransactionHandler::default();
        let committed = BTreeMap::new();
        let mut staged = BTreeMap::new();
        let declared = vec![String::new()];
        let mut ctx = ScratchContext::new(&committed, &mut staged, &declared, &declared);
        for payload in [
            &b"not json"[..],
            br#"{"action":"update","recordId":"s1"}"#,
            br#"{"action":"create","recordId":"s1","className":"c","hash":"00"}"#,
        ] {
            assert!(matches!(
                handler.apply_action(payload, "tx", &mut ctx),
                Err(ApplyError::Validation(_))
            ));
        }
    }

    #[test]
    fn empty_write_result_is_fatal() {
        let handler = SeedTransactionHandler::default();
        let payload = SeedAction::Create(create("s1")).to_bytes().unwrap();
        assert_eq!(
            handler
                .apply_action(&payload, "tx", &mut DroppingContext)
                .unwrap_err(),
            ApplyError::StateWriteFailed("s1".into())
        );
    }

    #[test]
    fn undeclared_address_is_context_error() {
        let handler = SeedTransactionHandler::default();
        let committed = BTreeMap::new();
        let mut staged = BTreeMap::new();
        let declared = vec![AddressCodec::seed().address("other").to_string()];
        let mut ctx = ScratchContext::new(&committed, &mut staged, &declared, &declared);
        let payload = SeedAction::Create(create("s1")).to_bytes().unwrap();
        assert!(matches!(
            handler.apply_action(&payload, "tx", &mut ctx),
            Err(ApplyError::Context(ContextError::Unauthorized(..)))
        ));
    }

    #[test]
    fn family_contract() {
        let handler = SeedTransactionHandler::default();
        assert_eq!(handler.family_name(), "seed");
        assert_eq!(handler.family_versions(), vec!["1.0".to_string()]);
        assert_eq!(handler.namespaces(), vec!["7cf2e5".to_string()]);
    }
}
