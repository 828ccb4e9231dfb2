//! # Cryptographic Error Types
//!
//! Structured errors for the Paillier cryptosystem. All of them indicate a
//! programmer or input error and are surfaced to callers unchanged.

use thiserror::Error;

/// Errors from Paillier key generation, encryption and ciphertext algebra.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Primality or coprimality constraints could not be met within the retry bound.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    /// Ciphertext is outside `[0, n^2)` or not a unit modulo `n^2`.
    #[error("decryption failed: {0}")]
    Decryption(String),

    /// Caller-supplied randomness is zero, too large, or shares a factor with `n`.
    #[error("invalid encryption randomness: {0}")]
    InvalidRandomness(String),

    /// Ciphertexts under different moduli were combined.
    #[error("modulus mismatch: {0}")]
    ModulusMismatch(String),

    /// A ciphertext operand is not a valid residue.
    #[error("invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    /// Key parameters are inconsistent.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// A decrypted plaintext does not fit the requested amount type.
    #[error("plaintext out of range: {0}")]
    PlaintextOutOfRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decryption_display() {
        let err = CryptoError::Decryption("ciphertext >= n^2".to_string());
        assert!(format!("{err}").contains("ciphertext >= n^2"));
    }

    #[test]
    fn all_variants_are_debug() {
        let variants = vec![
            CryptoError::KeyGeneration("a".into()),
            CryptoError::Decryption("b".into()),
            CryptoError::InvalidRandomness("c".into()),
            CryptoError::ModulusMismatch("d".into()),
            CryptoError::InvalidCiphertext("e".into()),
            CryptoError::InvalidKey("f".into()),
            CryptoError::PlaintextOutOfRange("g".into()),
        ];
        for v in variants {
            assert!(!format!("{v:?}").is_empty());
        }
    }
}
