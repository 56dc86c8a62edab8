use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::signature::Verifier;
use k256::ecdsa::{Signature, VerifyingKey};
use sha1::{Digest, Sha1};

/// Verify a seed-record signature over the raw bytes of a hex-encoded hash.
///
/// Record signatures are ECDSA over the SHA-1 prehash of those bytes; a
/// SHA-256 prehash is also accepted. Boolean-only: malformed hex, wrong-length
/// keys or signatures, and points off the curve all yield `false`.
pub fn verify(hash_hex: &str, signature_hex: &str, public_key_hex: &str) -> bool {
    let (Ok(message), Some(key), Some(signature)) = (
        hex::decode(hash_hex),
        parse_public_key(public_key_hex),
        parse_signature(signature_hex),
    ) else {
        return false;
    };
    key.verify_prehash(&Sha1::digest(&message), &signature).is_ok()
        || key.verify(&message, &signature).is_ok()
}

/// Verify a signature over arbitrary bytes.
pub fn verify_message(message: &[u8], signature_hex: &str, public_key_hex: &str) -> bool {
    let (Some(key), Some(signature)) = (
        parse_public_key(public_key_hex),
        parse_signature(signature_hex),
    ) else {
        return false;
    };
    key.verify(message, &signature).is_ok()
}

/// Accepts compressed (33 bytes), uncompressed (65 bytes) or raw `X || Y`
/// (64 bytes) encodings.
fn parse_public_key(public_key_hex: &str) -> Option<VerifyingKey> {
    let bytes = hex::decode(public_key_hex).ok()?;
    match bytes.len() {
        33 | 65 => VerifyingKey::from_sec1_bytes(&bytes).ok(),
        64 => {
            let mut sec1 = Vec::with_capacity(65);
            sec1.push(0x04);
            sec1.extend_from_slice(&bytes);
            VerifyingKey::from_sec1_bytes(&sec1).ok()
        }
        _ => None,
    }
}

fn parse_signature(signature_hex: &str) -> Option<Signature> {
    let bytes = hex::decode(signature_hex).ok()?;
    let signature = Signature::from_slice(&bytes).ok()?;
    // high-S signatures from other signers are otherwise rejected
    Some(signature.normalize_s().unwrap_or(signature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::sha256_hex;
    use crate::signer::Signer;
    use k256::ecdsa::signature::hazmat::PrehashSigner;
    use k256::ecdsa::SigningKey;
    use proptest::prelude::*;

    #[test]
    fn verifies_signed_hash() {
        let signer = Signer::generate();
        let hash = sha256_hex(b"seed-42 embedding");
        let sig = signer.sign_hash(&hash).unwrap();
        assert!(verify(&hash, &sig, signer.public_key_hex()));
    }

    #[test]
    fn uncompressed_and_raw_keys_accepted() {
        let signer = Signer::generate();
        let hash = sha256_hex(b"x");
        let sig = signer.sign_hash(&hash).unwrap();
        let compressed = hex::decode(signer.public_key_hex()).unwrap();
        let key = VerifyingKey::from_sec1_bytes(&compressed).unwrap();
        let uncompressed = key.to_encoded_point(false).as_bytes().to_vec();
        assert!(verify(&hash, &sig, &hex::encode(&uncompressed)));
        assert!(verify(&hash, &sig, &hex::encode(&uncompressed[1..])));
    }

    #[test]
    fn malformed_inputs_are_false() {
        let signer = Signer::generate();
        let hash = sha256_hex(b"x");
        let sig = signer.sign_hash(&hash).unwrap();
        let pk = signer.public_key_hex();
        assert!(!verify("zz", &sig, pk));
        assert!(!verify(&hash, "zz", pk));
        assert!(!verify(&hash, &sig[..126], pk));
        assert!(!verify(&hash, &sig, "02"));
        assert!(!verify(&hash, &sig, &"00".repeat(33)));
        assert!(!verify(&hash, &sig, ""));
    }

    #[test]
    fn accepts_sha1_prehashed_signature_under_raw_key() {
        let key = SigningKey::random(&mut rand::rngs::OsRng);
        let encoded = key.verifying_key().to_encoded_point(false);
        let raw_key = &encoded.as_bytes()[1..];
        let hash = sha256_hex(b"seed-42 embedding");
        let prehash = Sha1::digest(hex::decode(&hash).unwrap());
        let signature: Signature = key.sign_prehash(&prehash).unwrap();
        assert!(verify(
            &hash,
            &hex::encode(signature.to_bytes()),
            &hex::encode(raw_key)
        ));
    }

    #[test]
    fn accepts_sha256_prehashed_signature() {
        let signer = Signer::generate();
        let hash = sha256_hex(b"seed-42 embedding");
        let sig = signer.sign(&hex::decode(&hash).unwrap());
        assert!(verify(&hash, &sig, signer.public_key_hex()));
    }

    #[test]
    fn tampered_hash_fails() {
        let signer = Signer::generate();
        let sig = signer.sign_hash(&sha256_hex(b"original")).unwrap();
        assert!(!verify(&sha256_hex(b"tampered"), &sig, signer.public_key_hex()));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn signature_round_trip(data in proptest::collection::vec(any::<u8>(), 1..64)) {
            let signer = Signer::generate();
            let other = Signer::generate();
            let hash = sha256_hex(&data);
            let sig = signer.sign_hash(&hash).unwrap();
            prop_assert!(verify(&hash, &sig, signer.public_key_hex()));
            prop_assert!(!verify(&hash, &sig, other.public_key_hex()));
        }
    }
}
