//! # Content Digests
//!
//! SHA-256 digests over length-prefixed byte fields. The ledger uses them to
//! fingerprint accepted proofs (replay guard); the transparent proof backend
//! uses them to derive deterministic proof coordinates.
//!
//! ## Security Invariant
//!
//! Every field fed to a [`Sha256Accumulator`] through [`Sha256Accumulator::field`]
//! is prefixed with its length, so two different field sequences can never
//! produce the same preimage by shifting bytes across a boundary.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentDigest(pub [u8; 32]);

impl ContentDigest {
    /// Wrap raw digest bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentDigest({}...)", &self.to_hex()[..16])
    }
}

/// Incremental SHA-256 with an explicit domain tag.
#[derive(Clone)]
pub struct Sha256Accumulator {
    hasher: Sha256,
}

impl Sha256Accumulator {
    /// Start an accumulator with no domain tag.
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Start an accumulator bound to a domain tag.
    pub fn with_domain(domain: &str) -> Self {
        let mut acc = Self::new();
        acc.field(domain.as_bytes());
        acc
    }

    /// Append raw bytes.
    pub fn update(&mut self, data: &[u8]) -> &mut Self {
        self.hasher.update(data);
        self
    }

    /// Append a length-prefixed field.
    pub fn field(&mut self, data: &[u8]) -> &mut Self {
        self.hasher.update((data.len() as u64).to_be_bytes());
        self.hasher.update(data);
        self
    }

    /// Finish and return the digest.
    pub fn finalize(self) -> ContentDigest {
        let hash = self.hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        ContentDigest(bytes)
    }

    /// Finish and return the digest as lowercase hex.
    pub fn finalize_hex(self) -> String {
        self.finalize().to_hex()
    }
}

impl Default for Sha256Accumulator {
    fn default() -> Self {
        Self::new()
    }
}
