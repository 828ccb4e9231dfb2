//! # Error Types
//!
//! Errors for the primitive constructors in this crate. Higher layers wrap
//! these in their own `thiserror` enums.

use thiserror::Error;

/// Error constructing or parsing a BN254 field element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// The value is not strictly below the field modulus.
    #[error("value with {bits} bits does not fit in the BN254 scalar field")]
    Overflow {
        /// Bit length of the rejected value.
        bits: u64,
    },

    /// The decimal string could not be parsed.
    #[error("invalid decimal field element: {0}")]
    InvalidDecimal(String),
}

/// Error parsing an account address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Hex body must be exactly 40 characters.
    #[error("address must be 40 hex chars (optionally 0x-prefixed), got {0}")]
    InvalidLength(usize),

    /// Non-hex character in the address body.
    #[error("address contains non-hex characters: {0}")]
    InvalidHex(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_display_mentions_bits() {
        let err = FieldError::Overflow { bits: 300 };
        assert!(format!("{err}").contains("300"));
    }

    #[test]
    fn address_length_display() {
        let err = AddressError::InvalidLength(12);
        assert!(format!("{err}").contains("12"));
    }
}
