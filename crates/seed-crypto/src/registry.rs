use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SignerError;
use crate::signer::Signer;

/// A certifying party able to sign seed hashes.
#[derive(Clone, Debug)]
pub struct SignerIdentity {
    pub id: String,
    pub display_name: String,
    signer: Signer,
}

impl SignerIdentity {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>, signer: Signer) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            signer,
        }
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    pub fn public_key_hex(&self) -> &str {
        self.signer.public_key_hex()
    }
}

/// Public listing entry for a registered signer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSummary {
    pub id: String,
    pub display_name: String,
    pub public_key: String,
}

/// Output of [`sign_hash`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedHash {
    pub signature: String,
    pub public_key: String,
    pub signer_name: String,
}

/// Lookup of signer identities by id.
pub trait SignerRegistry: Send + Sync {
    fn get(&self, id: &str) -> Option<&SignerIdentity>;

    fn list(&self) -> Vec<SignerSummary>;
}

/// Sign a hex hash as the registered signer `signer_id`.
pub fn sign_hash(
    registry: &dyn SignerRegistry,
    hash_hex: &str,
    signer_id: &str,
) -> Result<SignedHash, SignerError> {
    let identity = registry
        .get(signer_id)
        .ok_or_else(|| SignerError::UnknownSigner(signer_id.to_string()))?;
    Ok(SignedHash {
        signature: identity.signer().sign_hash(hash_hex)?,
        public_key: identity.public_key_hex().to_string(),
        signer_name: identity.display_name.clone(),
    })
}

/// Registry held in memory, typically loaded from a TOML file:
///
/// ```toml
/// [[signer]]
/// id = "Nursery_A"
/// display_name = "Green Valley Nursery"
/// private_key = "<64 hex chars>"
/// public_key = "<optional, checked against private_key>"
/// ```
#[derive(Debug, Default)]
pub struct InMemorySignerRegistry {
    signers: BTreeMap<String, SignerIdentity>,
}

#[derive(Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "signer")]
    signers: Vec<SignerEntry>,
}

#[derive(Deserialize)]
struct SignerEntry {
    id: String,
    display_name: String,
    private_key: String,
    public_key: Option<String>,
}

impl InMemorySignerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identity: SignerIdentity) -> Result<(), SignerError> {
        if self.signers.contains_key(&identity.id) {
            return Err(SignerError::DuplicateSigner(identity.id));
        }
        self.signers.insert(identity.id.clone(), identity);
        Ok(())
    }

    pub fn from_toml_str(source: &str) -> Result<Self, SignerError> {
        let file: RegistryFile =
            toml::from_str(source).map_err(|e| SignerError::Config(e.to_string()))?;
        let mut registry = Self::new();
        for entry in file.signers {
            let signer = Signer::from_private_key_hex(&entry.private_key)?;
            if let Some(declared) = &entry.public_key {
                if !declared.eq_ignore_ascii_case(signer.public_key_hex()) {
                    return Err(SignerError::KeyMismatch(entry.id));
                }
            }
            registry.insert(SignerIdentity::new(entry.id, entry.display_name, signer))?;
        }
        Ok(registry)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SignerError> {
        let source = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SignerError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&source)
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}

impl SignerRegistry for InMemorySignerRegistry {
    fn get(&self, id: &str) -> Option<&SignerIdentity> {
        self.signers.get(id)
    }

    fn list(&self) -> Vec<SignerSummary> {
        self.signers
            .values()
            .map(|s| SignerSummary {
                id: s.id.clone(),
                display_name: s.display_name.clone(),
                public_key: s.public_key_hex().to_string(),
            })
            .collect()
    }
}
