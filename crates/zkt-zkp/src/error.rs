//! # Proof and Codec Error Types

use thiserror::Error;
use zkt_core::FieldError;

use crate::statement::StatementKind;

/// Errors from translating between domain values and public signals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The signal vector does not match the statement's fixed layout.
    #[error("{statement} expects {expected} public signals, got {actual}")]
    SignalCount {
        statement: StatementKind,
        expected: usize,
        actual: usize,
    },

    /// A value does not fit in the BN254 scalar field.
    #[error("field encoding failed: {0}")]
    Field(#[from] FieldError),

    /// The `(g, n)` pair in the signals is not a usable public key.
    #[error("invalid public key in signals: {0}")]
    InvalidKey(String),

    /// A ciphertext in the signals lies outside `[0, n^2)` for its key.
    #[error("ciphertext out of range: {0}")]
    CiphertextOutOfRange(String),

    /// A toolchain artifact could not be parsed.
    #[error("malformed artifact: {0}")]
    Artifact(String),
}

/// Error during proof generation.
#[derive(Error, Debug)]
pub enum ProofError {
    /// The witness does not satisfy the statement's constraints.
    #[error("unsatisfied constraint: {0}")]
    UnsatisfiedConstraint(String),

    /// Public inputs could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The proving key belongs to a different statement.
    #[error("key mismatch: {0}")]
    KeyMismatch(String),

    /// The proving backend failed.
    #[error("prover backend error: {0}")]
    Backend(String),

    /// The caller raised the cancellation flag before proving finished.
    #[error("proving cancelled")]
    Cancelled,
}

/// Error during proof verification.
///
/// A well-formed proof that does not verify is `Ok(false)`, not an error.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The proof or signals cannot be interpreted at all.
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// The verifying key is incompatible with the proof system.
    #[error("key mismatch: {0}")]
    KeyMismatch(String),

    /// The verification backend failed.
    #[error("verifier backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_count_display() {
        let err = CodecError::SignalCount {
            statement: StatementKind::Transfer,
            expected: 7,
            actual: 3,
        };
        assert_eq!(format!("{err}"), "transfer expects 7 public signals, got 3");
    }

    #[test]
    fn codec_error_converts_into_proof_error() {
        let err: ProofError = CodecError::InvalidKey("even modulus".into()).into();
        assert!(matches!(err, ProofError::Codec(_)));
        assert!(format!("{err}").contains("even modulus"));
    }

    #[test]
    fn field_error_converts_into_codec_error() {
        let err: CodecError = FieldError::Overflow { bits: 300 }.into();
        assert!(matches!(err, CodecError::Field(_)));
    }

    #[test]
    fn verify_error_display() {
        let err = VerifyError::MalformedProof("short".into());
        assert_eq!(format!("{err}"), "malformed proof: short");
    }
}
