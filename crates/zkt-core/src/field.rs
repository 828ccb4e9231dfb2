//! # BN254 Scalar Field Elements
//!
//! Public signals, proof coordinates and every circuit input are elements of
//! the BN254 (alt_bn128) scalar field. `FieldElement` can only be built from
//! a value strictly below the modulus.
//!
//! ## Security Invariant
//!
//! Paillier ciphertexts live in `[0, n^2)`. If `n^2` exceeded the field
//! modulus, a ciphertext would be reduced inside the circuit and the proof
//! would bind a different value than the ledger stores. Rejecting overflow at
//! construction makes that mismatch unrepresentable.

use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::FieldError;

/// Decimal form of the BN254 scalar field modulus.
pub const BN254_SCALAR_MODULUS: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

/// The BN254 scalar field modulus.
pub fn field_modulus() -> &'static BigUint {
    static MODULUS: OnceLock<BigUint> = OnceLock::new();
    MODULUS.get_or_init(|| {
        BigUint::parse_bytes(BN254_SCALAR_MODULUS.as_bytes(), 10).unwrap_or_else(BigUint::zero)
    })
}

/// An element of the BN254 scalar field.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldElement(BigUint);

impl FieldElement {
    /// Wrap a value, rejecting anything `>= field_modulus()`.
    pub fn new(value: BigUint) -> Result<Self, FieldError> {
        if &value >= field_modulus() {
            return Err(FieldError::Overflow { bits: value.bits() });
        }
        Ok(Self(value))
    }

    /// Reduce arbitrary bytes (big-endian) into the field.
    pub fn from_bytes_reduced(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes) % field_modulus())
    }

    /// Field element from a small integer.
    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    /// Parse from a decimal string.
    pub fn from_decimal(s: &str) -> Result<Self, FieldError> {
        let value = crate::decimal::parse(s).map_err(FieldError::InvalidDecimal)?;
        Self::new(value)
    }

    /// Borrow the underlying integer.
    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    /// Consume into the underlying integer.
    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    /// Decimal string form.
    pub fn to_decimal(&self) -> String {
        self.0.to_str_radix(10)
    }

    /// Fixed-width 32-byte big-endian encoding, used for hashing.
    pub fn to_bytes32(&self) -> [u8; 32] {
        let raw = self.0.to_bytes_be();
        let mut out = [0u8; 32];
        // Below the modulus the value always fits in 32 bytes.
        let start = 32usize.saturating_sub(raw.len());
        out[start..].copy_from_slice(&raw[raw.len().saturating_sub(32)..]);
        out
    }
}

impl TryFrom<BigUint> for FieldElement {
    type Error = FieldError;

    fn try_from(value: BigUint) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl std::fmt::Debug for FieldElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FieldElement({})", self.to_decimal())
    }
}

impl Serialize for FieldElement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for FieldElement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_decimal(&s).map_err(serde::de::Error::custom)
    }
}
