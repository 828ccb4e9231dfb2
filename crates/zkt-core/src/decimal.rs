//! # Decimal Big-Integer Serde
//!
//! Serializes `BigUint` as a base-10 string. The proving toolchain exchanges
//! every field element, key component and ciphertext as a decimal string, so
//! the Rust types use the same representation on the wire.
//!
//! Use with `#[serde(with = "zkt_core::decimal")]`.

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serializer};

/// Serialize a `BigUint` as a decimal string.
pub fn serialize<S: Serializer>(value: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_str_radix(10))
}

/// Deserialize a `BigUint` from a decimal string.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigUint, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse(&s).map_err(serde::de::Error::custom)
}

/// Parse a decimal string into a `BigUint`.
pub fn parse(s: &str) -> Result<BigUint, String> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("not a decimal integer: {s:?}"));
    }
    BigUint::parse_bytes(s.as_bytes(), 10).ok_or_else(|| format!("not a decimal integer: {s:?}"))
}
