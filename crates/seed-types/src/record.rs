use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Document type tag carried by every stored record.
pub const RECORD_DOC_TYPE: &str = "seedRecord";

/// The attested fact stored in ledger state.
///
/// Records are immutable once created. The ledger owns the canonical copy;
/// clients only ever hold deserialized copies of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub record_id: String,
    pub class_name: String,
    pub hash: String,
    pub timestamp: String,
    pub creator_tx_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_name: Option<String>,
    pub doc_type: String,
}

impl Record {
    /// Whether the record carries both a signature and the key it verifies against.
    pub fn is_signed(&self) -> bool {
        self.signature.is_some() && self.public_key.is_some()
    }

    /// Serialized form stored at the record's address.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        serde_json::from_slice(bytes).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record {
            record_id: "seed-42".into(),
            class_name: "palm".into(),
            hash: "ab".repeat(32),
            timestamp: "2026-01-01T00:00:00Z".into(),
            creator_tx_id: "f00d".into(),
            signature: None,
            public_key: None,
            signer_name: None,
            doc_type: RECORD_DOC_TYPE.into(),
        }
    }

    #[test]
    fn wire_field_names() {
        let json: serde_json::Value = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["recordId"], "seed-42");
        assert_eq!(json["className"], "palm");
        assert_eq!(json["creatorTxId"], "f00d");
        assert_eq!(json["docType"], "seedRecord");
        assert!(json.get("signature").is_none());
    }

    #[test]
    fn unsigned_record_is_not_signed() {
        let mut record = sample();
        assert!(!record.is_signed());
        record.signature = Some("00".into());
        assert!(!record.is_signed());
        record.public_key = Some("02".into());
        assert!(record.is_signed());
    }

    #[test]
    fn bytes_roundtrip_preserves_optional_fields() {
        let mut record = sample();
        record.signature = Some("aa".into());
        record.signer_name = Some("Green Valley Nursery".into());
        let parsed = Record::from_bytes(&record.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn from_bytes_rejects_garbage() {
        assert!(matches!(
            Record::from_bytes(b"not json"),
            Err(TypeError::Serialization(_))
        ));
    }
}
