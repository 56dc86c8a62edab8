//! Protobuf envelopes.
//!
//! Field numbers follow the validator's `transaction.proto` and `batch.proto`
//! so a serialized [`BatchList`] can be posted to `/batches` as-is.

use prost::Message;

use crate::error::{ProtocolError, ProtocolResult};

#[derive(Clone, PartialEq, Message)]
pub struct TransactionHeader {
    #[prost(string, tag = "1")]
    pub batcher_public_key: String,
    #[prost(string, repeated, tag = "2")]
    pub dependencies: Vec<String>,
    #[prost(string, tag = "3")]
    pub family_name: String,
    #[prost(string, tag = "4")]
    pub family_version: String,
    #[prost(string, repeated, tag = "5")]
    pub inputs: Vec<String>,
    #[prost(string, tag = "6")]
    pub nonce: String,
    #[prost(string, repeated, tag = "7")]
    pub outputs: Vec<String>,
    #[prost(string, tag = "9")]
    pub payload_sha512: String,
    #[prost(string, tag = "10")]
    pub signer_public_key: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Transaction {
    #[prost(bytes = "vec", tag = "1")]
    pub header: Vec<u8>,
    #[prost(string, tag = "2")]
    pub header_signature: String,
    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct BatchHeader {
    #[prost(string, tag = "1")]
    pub signer_public_key: String,
    #[prost(string, repeated, tag = "2")]
    pub transaction_ids: Vec<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct Batch {
    #[prost(bytes = "vec", tag = "1")]
    pub header: Vec<u8>,
    #[prost(string, tag = "2")]
    pub header_signature: String,
    #[prost(message, repeated, tag = "3")]
    pub transactions: Vec<Transaction>,
    #[prost(bool, tag = "4")]
    pub trace: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct BatchList {
    #[prost(message, repeated, tag = "1")]
    pub batches: Vec<Batch>,
}

impl Transaction {
    /// Transaction id: the header signature.
    pub fn id(&self) -> &str {
        &self.header_signature
    }

    pub fn decode_header(&self) -> ProtocolResult<TransactionHeader> {
        TransactionHeader::decode(self.header.as_slice()).map_err(|e| ProtocolError::Decode {
            what: "transaction header",
            reason: e.to_string(),
        })
    }
}

impl Batch {
    /// Batch id: the header signature.
    pub fn id(&self) -> &str {
        &self.header_signature
    }

    pub fn decode_header(&self) -> ProtocolResult<BatchHeader> {
        BatchHeader::decode(self.header.as_slice()).map_err(|e| ProtocolError::Decode {
            what: "batch header",
            reason: e.to_string(),
        })
    }
}

impl BatchList {
    pub fn single(batch: Batch) -> Self {
        Self {
            batches: vec![batch],
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> ProtocolResult<Self> {
        Self::decode(bytes).map_err(|e| ProtocolError::Decode {
            what: "batch list",
            reason: e.to_string(),
        })
    }
}
