use k256::ecdsa::signature::hazmat::PrehashSigner;
use k256::ecdsa::signature::Signer as _;
use k256::ecdsa::{Signature, SigningKey};
use sha1::{Digest, Sha1};

use crate::error::SignerError;

/// secp256k1 signing key together with its compressed public key.
///
/// Immutable once constructed; cloning shares no mutable state, so a signer
/// can be handed to any number of concurrent submissions.
#[derive(Clone)]
pub struct Signer {
    key: SigningKey,
    public_key_hex: String,
}

impl Signer {
    /// Generate a new random key. Intended for development and tests.
    pub fn generate() -> Self {
        Self::from_key(SigningKey::random(&mut rand::rngs::OsRng))
    }

    /// Load from a hex-encoded 32-byte secret scalar.
    pub fn from_private_key_hex(private_key_hex: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(private_key_hex.trim())
            .map_err(|e| SignerError::InvalidHex(e.to_string()))?;
        let key =
            SigningKey::from_slice(&bytes).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Ok(Self::from_key(key))
    }

    fn from_key(key: SigningKey) -> Self {
        let public_key_hex = hex::encode(key.verifying_key().to_encoded_point(true).as_bytes());
        Self {
            key,
            public_key_hex,
        }
    }

    /// Compressed SEC1 public key (33 bytes), hex-encoded.
    pub fn public_key_hex(&self) -> &str {
        &self.public_key_hex
    }

    /// Hex-encoded secret scalar, for exporting generated keys.
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.key.to_bytes())
    }

    /// Sign arbitrary bytes (SHA-256 prehash), returning a 64-byte compact
    /// `r || s` signature in hex.
    pub fn sign(&self, message: &[u8]) -> String {
        let signature: Signature = self.key.sign(message);
        hex::encode(signature.to_bytes())
    }

    /// Sign the raw bytes of a hex-encoded hash for a seed record.
    ///
    /// Record signatures prehash with SHA-1, the default of the nursery
    /// signing tools, so records signed here and there verify the same way.
    pub fn sign_hash(&self, hash_hex: &str) -> Result<String, SignerError> {
        let message = hex::decode(hash_hex).map_err(|e| SignerError::InvalidHex(e.to_string()))?;
        let signature: Signature = self
            .key
            .sign_prehash(&Sha1::digest(&message))
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        Ok(hex::encode(signature.to_bytes()))
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signer(public={}, secret=<redacted>)", self.public_key_hex)
    }
}
