use prost::Message;
use seed_crypto::{sha512_hex, Signer};
use seed_types::{Address, AddressCodec, SeedAction, FAMILY_NAME, FAMILY_VERSION};

use crate::error::ProtocolResult;
use crate::wire::{Batch, BatchHeader, Transaction, TransactionHeader};

/// Builds signed transactions for one transaction family.
#[derive(Clone, Debug)]
pub struct TransactionBuilder {
    family_name: String,
    family_version: String,
}

impl TransactionBuilder {
    pub fn new(family_name: impl Into<String>, family_version: impl Into<String>) -> Self {
        Self {
            family_name: family_name.into(),
            family_version: family_version.into(),
        }
    }

    /// Builder for the `seed` family, version `1.0`.
    pub fn seed() -> Self {
        Self::new(FAMILY_NAME, FAMILY_VERSION)
    }

    /// Sign `payload` into a transaction.
    ///
    /// The signer's public key is used as both signer and batcher key, so the
    /// transaction must be batched by the same signer.
    pub fn build(
        &self,
        payload: Vec<u8>,
        inputs: &[Address],
        outputs: &[Address],
        signer: &Signer,
    ) -> Transaction {
        let header = TransactionHeader {
            batcher_public_key: signer.public_key_hex().to_string(),
            dependencies: Vec::new(),
            family_name: self.family_name.clone(),
            family_version: self.family_version.clone(),
            inputs: inputs.iter().map(|a| a.to_string()).collect(),
            nonce: uuid::Uuid::now_v7().simple().to_string(),
            outputs: outputs.iter().map(|a| a.to_string()).collect(),
            payload_sha512: sha512_hex(&payload),
            signer_public_key: signer.public_key_hex().to_string(),
        }
        .encode_to_vec();

        let header_signature = signer.sign(&header);
        Transaction {
            header,
            header_signature,
            payload,
        }
    }

    /// Encode a seed action addressed to the record it names.
    pub fn seed_action(
        &self,
        action: &SeedAction,
        codec: &AddressCodec,
        signer: &Signer,
    ) -> ProtocolResult<Transaction> {
        let payload = action.to_bytes()?;
        let address = codec.address(action.record_id());
        let addresses = [address];
        Ok(self.build(payload, &addresses, &addresses, signer))
    }
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::seed()
    }
}

/// Wraps transactions into a signed batch.
pub struct BatchBuilder;

impl BatchBuilder {
    /// Batch `transactions` in the given order.
    ///
    /// # Panics
    ///
    /// Panics if `transactions` is empty; an empty batch is a caller bug.
    pub fn build(transactions: Vec<Transaction>, signer: &Signer) -> Batch {
        assert!(
            !transactions.is_empty(),
            "a batch must contain at least one transaction"
        );
        let header = BatchHeader {
            signer_public_key: signer.public_key_hex().to_string(),
            transaction_ids: transactions
                .iter()
                .map(|t| t.header_signature.clone())
                .collect(),
        }
        .encode_to_vec();

        let header_signature = signer.sign(&header);
        tracing::debug!(
            batch_id = %&header_signature[..16],
            transactions = transactions.len(),
            "built batch"
        );
        Batch {
            header,
            header_signature,
            transactions,
            trace: false,
        }
    }
}
