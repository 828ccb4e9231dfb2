//! # Account Addresses
//!
//! A 20-byte account address, rendered as `0x`-prefixed lowercase hex. The
//! ledger keys every account by `Address`; the type prevents a public key,
//! ciphertext or free-form string from being used where an account is meant.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AddressError;

/// A ledger account address (20 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Create an address from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Generate a random address. Used by tests and the demo CLI.
    pub fn random() -> Self {
        let mut bytes = [0u8; 20];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Return the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Render as `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        let body: String = self.0.iter().map(|b| format!("{b:02x}")).collect();
        format!("0x{body}")
    }

    /// Parse from 40 hex chars, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        let body = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if body.len() != 40 {
            return Err(AddressError::InvalidLength(body.len()));
        }
        let mut bytes = [0u8; 20];
        for (i, chunk) in body.as_bytes().chunks(2).enumerate() {
            let pair = std::str::from_utf8(chunk)
                .map_err(|_| AddressError::InvalidHex(body.to_string()))?;
            bytes[i] = u8::from_str_radix(pair, 16)
                .map_err(|_| AddressError::InvalidHex(body.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl std::str::FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let addr = Address::from_bytes([0xab; 20]);
        let hex = addr.to_hex();
        assert_eq!(hex.len(), 42);
        assert!(hex.starts_with("0x"));
        assert_eq!(Address::from_hex(&hex).unwrap(), addr);
    }

    #[test]
    fn parses_without_prefix() {
        let body = "00112233445566778899aabbccddeeff00112233";
        let addr = Address::from_hex(body).unwrap();
        assert_eq!(addr.as_bytes()[1], 0x11);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            Address::from_hex("0x1234"),
            Err(AddressError::InvalidLength(4))
        ));
    }

    #[test]
    fn rejects_non_hex() {
        let bad = "zz112233445566778899aabbccddeeff00112233";
        assert!(matches!(
            Address::from_hex(bad),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn random_addresses_differ() {
        assert_ne!(Address::random(), Address::random());
    }

    #[test]
    fn serde_as_hex_string() {
        let addr = Address::from_bytes([1; 20]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
