use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::record::{Record, RECORD_DOC_TYPE};

/// Transaction payload for the seed family.
///
/// Encoded as a UTF-8 JSON object `{"action": ..., "recordId": ..., ...}`.
/// Required string fields default to empty when absent so that
/// [`SeedAction::validate`] can name the missing field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SeedAction {
    Create(CreateRecord),
    Get {
        #[serde(rename = "recordId", alias = "seedId", default)]
        record_id: String,
    },
}

/// Fields of a `create` action.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecord {
    #[serde(default, alias = "seedId")]
    pub record_id: String,
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer_name: Option<String>,
}

impl SeedAction {
    pub fn get(record_id: impl Into<String>) -> Self {
        Self::Get {
            record_id: record_id.into(),
        }
    }

    /// Decode and validate a payload.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeError> {
        let action: Self =
            serde_json::from_slice(bytes).map_err(|e| TypeError::InvalidPayload(e.to_string()))?;
        action.validate()?;
        Ok(action)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Get { .. } => "get",
        }
    }

    pub fn record_id(&self) -> &str {
        match self {
            Self::Create(create) => &create.record_id,
            Self::Get { record_id } => record_id,
        }
    }

    /// Check that every required field is non-empty.
    pub fn validate(&self) -> Result<(), TypeError> {
        match self {
            Self::Create(create) => create.validate(),
            Self::Get { record_id } => require("recordId", record_id),
        }
    }
}

impl CreateRecord {
    pub fn validate(&self) -> Result<(), TypeError> {
        require("recordId", &self.record_id)?;
        require("className", &self.class_name)?;
        require("hash", &self.hash)?;
        require("timestamp", &self.timestamp)
    }

    /// Signature and public key, only when both are present and non-empty.
    pub fn signature_pair(&self) -> Option<(&str, &str)> {
        match (non_empty(&self.signature), non_empty(&self.public_key)) {
            (Some(signature), Some(public_key)) => Some((signature, public_key)),
            _ => None,
        }
    }

    /// The record this action creates, attributed to `creator_tx_id`.
    pub fn into_record(self, creator_tx_id: impl Into<String>) -> Record {
        let signed = self.signature_pair().is_some();
        Record {
            record_id: self.record_id,
            class_name: self.class_name,
            hash: self.hash,
            timestamp: self.timestamp,
            creator_tx_id: creator_tx_id.into(),
            signature: if signed { self.signature } else { None },
            public_key: if signed { self.public_key } else { None },
            signer_name: self.signer_name.filter(|s| !s.is_empty()),
            doc_type: RECORD_DOC_TYPE.into(),
        }
    }
}

fn require(field: &'static str, value: &str) -> Result<(), TypeError> {
    if value.is_empty() {
        Err(TypeError::MissingField(field))
    } else {
        Ok(())
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}
