//! Paillier ciphertexts.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zkt_core::{FieldElement, FieldError};

/// A Paillier ciphertext: an element of `Z*_{n^2}` for some public key.
///
/// The wrapper does not remember which key produced it. Operations that
/// combine ciphertexts take the public key explicitly and range-check every
/// operand against its `n^2`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ciphertext(#[serde(with = "zkt_core::decimal")] BigUint);

impl Ciphertext {
    /// Wrap a raw residue. No range check is performed here.
    pub fn from_biguint(value: BigUint) -> Self {
        Self(value)
    }

    /// Parse a decimal string as produced by [`Ciphertext::to_decimal`].
    pub fn from_decimal(s: &str) -> Result<Self, String> {
        zkt_core::decimal::parse(s).map(Self)
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }

    pub fn to_decimal(&self) -> String {
        self.0.to_str_radix(10)
    }

    /// Encode as a public signal. Fails if the residue exceeds the field.
    pub fn to_field_element(&self) -> Result<FieldElement, FieldError> {
        FieldElement::new(self.0.clone())
    }
}

impl From<FieldElement> for Ciphertext {
    fn from(value: FieldElement) -> Self {
        Self(value.into_biguint())
    }
}

impl std::fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl std::fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dec = self.to_decimal();
        if dec.len() > 24 {
            write!(f, "Ciphertext({}...{})", &dec[..10], &dec[dec.len() - 10..])
        } else {
            write!(f, "Ciphertext({dec})")
        }
    }
}
