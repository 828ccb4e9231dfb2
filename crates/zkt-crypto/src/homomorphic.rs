//! # Homomorphic Ciphertext Algebra
//!
//! | Operation | Ciphertext            | Plaintext        |
//! |-----------|-----------------------|------------------|
//! | add       | `c1 * c2 mod n^2`     | `m1 + m2 mod n`  |
//! | negate    | `c^-1 mod n^2`        | `-m mod n`       |
//! | scale     | `c^k mod n^2`         | `k * m mod n`    |
//!
//! Every operand is range-checked against the key's `n^2` first; combining a
//! ciphertext from a larger key is reported as a modulus mismatch rather than
//! silently reduced.

use num_bigint::BigUint;

use crate::arith::mod_inverse;
use crate::ciphertext::Ciphertext;
use crate::error::CryptoError;
use crate::paillier::PublicKey;

/// `c1 * c2 mod n^2` for the key with modulus `n`.
pub fn homomorphic_add(
    c1: &Ciphertext,
    c2: &Ciphertext,
    n: &BigUint,
) -> Result<Ciphertext, CryptoError> {
    let pk = PublicKey::new(n + 1u32, n.clone())?;
    pk.add(c1, c2)
}

impl PublicKey {
    /// Encryption of the sum of the two plaintexts.
    pub fn add(&self, c1: &Ciphertext, c2: &Ciphertext) -> Result<Ciphertext, CryptoError> {
        self.check_ciphertext(c1)?;
        self.check_ciphertext(c2)?;
        let n2 = self.n_squared();
        Ok(Ciphertext::from_biguint(
            (c1.as_biguint() * c2.as_biguint()) % &n2,
        ))
    }

    /// Encryption of the additive inverse of the plaintext.
    pub fn negate(&self, c: &Ciphertext) -> Result<Ciphertext, CryptoError> {
        self.check_ciphertext(c)?;
        let n2 = self.n_squared();
        mod_inverse(c.as_biguint(), &n2)
            .map(Ciphertext::from_biguint)
            .ok_or_else(|| CryptoError::InvalidCiphertext("no inverse modulo n^2".into()))
    }

    /// Encryption of `k` times the plaintext.
    pub fn scale(&self, c: &Ciphertext, k: &BigUint) -> Result<Ciphertext, CryptoError> {
        self.check_ciphertext(c)?;
        let n2 = self.n_squared();
        Ok(Ciphertext::from_biguint(c.as_biguint().modpow(k, &n2)))
    }
}
