use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

use crate::error::TypeError;

/// Transaction family served by the seed handler.
pub const FAMILY_NAME: &str = "seed";
/// Only supported family version.
pub const FAMILY_VERSION: &str = "1.0";

/// Hex characters in a namespace prefix.
pub const NAMESPACE_LEN: usize = 6;
/// Hex characters in a full state address.
pub const ADDRESS_LEN: usize = 70;

/// A 70-hex-character state address: `namespace ++ sha512(recordId)[..64]`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse an address, requiring exactly 70 lowercase hex characters.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.len() != ADDRESS_LEN {
            return Err(TypeError::InvalidLength {
                expected: ADDRESS_LEN,
                actual: s.len(),
            });
        }
        if !s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(TypeError::InvalidHex(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 6-character namespace prefix.
    pub fn namespace(&self) -> &str {
        &self.0[..NAMESPACE_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}..{})", &self.0[..NAMESPACE_LEN], &self.0[ADDRESS_LEN - 8..])
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Address {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Maps record identifiers to state addresses within a family namespace.
///
/// Address derivation is a pure function of `(family_name, record_id)`.
/// The client that builds transactions and the handler that applies them
/// both go through this codec, so they always agree on where a record lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AddressCodec {
    family_name: String,
    namespace: String,
}

impl AddressCodec {
    /// Codec for an arbitrary family.
    pub fn new(family_name: impl Into<String>) -> Self {
        let family_name = family_name.into();
        let namespace = sha512_hex(family_name.as_bytes())[..NAMESPACE_LEN].to_string();
        Self {
            family_name,
            namespace,
        }
    }

    /// Codec for the `seed` family.
    pub fn seed() -> Self {
        Self::new(FAMILY_NAME)
    }

    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// First 6 hex characters of `sha512(family_name)`.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// State address of a record.
    pub fn address(&self, record_id: &str) -> Address {
        let digest = sha512_hex(record_id.as_bytes());
        let mut address = String::with_capacity(ADDRESS_LEN);
        address.push_str(&self.namespace);
        address.push_str(&digest[..ADDRESS_LEN - NAMESPACE_LEN]);
        Address(address)
    }

    /// Whether an address falls inside this codec's namespace.
    pub fn owns(&self, address: &Address) -> bool {
        address.namespace() == self.namespace
    }
}

impl Default for AddressCodec {
    fn default() -> Self {
        Self::seed()
    }
}

fn sha512_hex(data: &[u8]) -> String {
    hex::encode(Sha512::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seed_namespace() {
        assert_eq!(AddressCodec::seed().namespace(), "7cf2e5");
    }

    #[test]
    fn known_address() {
        let address = AddressCodec::seed().address("seed-42");
        assert_eq!(
            address.as_str(),
            "7cf2e57cafcaff9d3fc1ee338cdf3b13bd8c41d0ff813171e935cbd7f43d1290e90fde"
        );
        assert_eq!(address.as_str().len(), ADDRESS_LEN);
    }

    #[test]
    fn matches_other_families() {
        // intkey's well-known namespace
        assert_eq!(AddressCodec::new("intkey").namespace(), "1cf126");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(
            Address::parse("7cf2e5"),
            Err(TypeError::InvalidLength { expected: 70, actual: 6 })
        ));
        let upper = "7CF2E57cafcaff9d3fc1ee338cdf3b13bd8c41d0ff813171e935cbd7f43d1290e90fde";
        assert!(matches!(Address::parse(upper), Err(TypeError::InvalidHex(_))));
    }

    #[test]
    fn serde_as_plain_string() {
        let address = AddressCodec::seed().address("x");
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, format!("\"{address}\""));
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, address);
        assert!(serde_json::from_str::<Address>("\"abc\"").is_err());
    }

    #[test]
    fn owns_only_own_namespace() {
        let seed = AddressCodec::seed();
        let other = AddressCodec::new("intkey");
        assert!(seed.owns(&seed.address("a")));
        assert!(!seed.owns(&other.address("a")));
    }

    proptest! {
        #[test]
        fn address_is_deterministic(record_id in ".*") {
            let a = AddressCodec::seed().address(&record_id);
            let b = AddressCodec::new(FAMILY_NAME).address(&record_id);
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.as_str().len(), ADDRESS_LEN);
            prop_assert!(Address::parse(a.as_str()).is_ok());
        }

        #[test]
        fn distinct_ids_distinct_addresses(a in "[a-z0-9-]{1,24}", b in "[a-z0-9-]{1,24}") {
            prop_assume!(a != b);
            let codec = AddressCodec::seed();
            prop_assert_ne!(codec.address(&a), codec.address(&b));
        }
    }
}
