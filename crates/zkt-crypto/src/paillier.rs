//! # Paillier Keys, Encryption and Decryption
//!
//! ## Security Invariant
//!
//! `PrivateKey` intentionally does NOT implement `Serialize`. The transfer
//! statement needs the sender's private key as a witness, so the components
//! are reachable through accessors, but there is no path that writes them to
//! the wire by accident. Key material is zeroized on drop.

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::Rng;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;
use zkt_core::Amount;

use crate::arith::{l_function, mod_inverse, wipe};
use crate::ciphertext::Ciphertext;
use crate::error::CryptoError;
use crate::primes::generate_prime;

/// Smallest supported modulus size in bits.
pub const MIN_KEY_BITS: u64 = 16;

/// Smallest even modulus size for account keys: every `u64` amount is then
/// a canonical plaintext below `n`.
pub const MIN_ACCOUNT_KEY_BITS: u64 = 66;

/// Retry bound for drawing a prime pair that satisfies every key constraint.
pub const MAX_KEYGEN_ATTEMPTS: usize = 64;

// ---------------------------------------------------------------------------
// Public key
// ---------------------------------------------------------------------------

/// Paillier public key `(g, n)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(with = "zkt_core::decimal")]
    g: BigUint,
    #[serde(with = "zkt_core::decimal")]
    n: BigUint,
}

impl PublicKey {
    /// Build a public key from its components.
    ///
    /// `n` must be odd and greater than one; `g` must be a unit in `[1, n^2)`.
    pub fn new(g: BigUint, n: BigUint) -> Result<Self, CryptoError> {
        if n <= BigUint::one() || n.is_even() {
            return Err(CryptoError::InvalidKey(
                "modulus must be an odd integer greater than one".into(),
            ));
        }
        let n2 = &n * &n;
        if g.is_zero() || g >= n2 || !g.gcd(&n).is_one() {
            return Err(CryptoError::InvalidKey(
                "generator must be a unit modulo n^2".into(),
            ));
        }
        Ok(Self { g, n })
    }

    pub fn g(&self) -> &BigUint {
        &self.g
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    pub fn n_squared(&self) -> BigUint {
        &self.n * &self.n
    }

    /// Bit length of the modulus `n`.
    pub fn bits(&self) -> u64 {
        self.n.bits()
    }

    /// `true` when `n > u64::MAX`, so no `u64` amount reduces modulo `n`.
    pub fn covers_amounts(&self) -> bool {
        self.n.bits() > u64::BITS as u64
    }

    /// `[g, n, n^2]`, the layout exposed by the ledger's public key query.
    pub fn components(&self) -> [BigUint; 3] {
        [self.g.clone(), self.n.clone(), self.n_squared()]
    }

    /// Draw encryption randomness uniformly from the units of `Z_n`.
    pub fn random_nonce<R: Rng + ?Sized>(&self, rng: &mut R) -> BigUint {
        let one = BigUint::one();
        loop {
            let r = rng.gen_biguint_range(&one, &self.n);
            if r.gcd(&self.n).is_one() {
                return r;
            }
        }
    }

    fn check_randomness(&self, r: &BigUint) -> Result<(), CryptoError> {
        if r.is_zero() {
            return Err(CryptoError::InvalidRandomness("r is zero".into()));
        }
        if r >= &self.n {
            return Err(CryptoError::InvalidRandomness("r is not below n".into()));
        }
        if !r.gcd(&self.n).is_one() {
            return Err(CryptoError::InvalidRandomness(
                "r shares a factor with n".into(),
            ));
        }
        Ok(())
    }

    /// `Enc(m; r) = g^m * r^n mod n^2`, with `m` reduced modulo `n`.
    pub fn encrypt(&self, m: &BigUint, r: &BigUint) -> Result<Ciphertext, CryptoError> {
        self.check_randomness(r)?;
        let n2 = self.n_squared();
        let m = m % &self.n;
        let gm = self.g.modpow(&m, &n2);
        let rn = r.modpow(&self.n, &n2);
        Ok(Ciphertext::from_biguint((gm * rn) % &n2))
    }

    pub fn encrypt_amount(&self, amount: Amount, r: &BigUint) -> Result<Ciphertext, CryptoError> {
        self.encrypt(&BigUint::from(amount.get()), r)
    }

    /// Encrypt `-amount`, represented as `n - amount`.
    pub fn encrypt_negated(&self, amount: Amount, r: &BigUint) -> Result<Ciphertext, CryptoError> {
        self.encrypt(&self.negated_plaintext(amount), r)
    }

    /// The plaintext residue that stands for `-amount`.
    pub fn negated_plaintext(&self, amount: Amount) -> BigUint {
        let v = BigUint::from(amount.get()) % &self.n;
        if v.is_zero() {
            v
        } else {
            &self.n - v
        }
    }

    /// Range check a ciphertext operand against this key's `n^2`.
    pub(crate) fn check_ciphertext(&self, c: &Ciphertext) -> Result<(), CryptoError> {
        let v = c.as_biguint();
        if v >= &self.n_squared() {
            return Err(CryptoError::ModulusMismatch(format!(
                "{}-bit ciphertext exceeds n^2 of a {}-bit key",
                v.bits(),
                self.bits()
            )));
        }
        if v.is_zero() || !v.gcd(&self.n).is_one() {
            return Err(CryptoError::InvalidCiphertext(
                "not a unit modulo n^2".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Private key
// ---------------------------------------------------------------------------

/// Paillier private key `(lambda, mu, n)`.
#[derive(Clone, PartialEq, Eq)]
pub struct PrivateKey {
    lambda: BigUint,
    mu: BigUint,
    n: BigUint,
}

impl PrivateKey {
    pub fn lambda(&self) -> &BigUint {
        &self.lambda
    }

    pub fn mu(&self) -> &BigUint {
        &self.mu
    }

    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// `Dec(c) = L(c^lambda mod n^2) * mu mod n`.
    pub fn decrypt(&self, c: &Ciphertext) -> Result<BigUint, CryptoError> {
        let n2 = &self.n * &self.n;
        let v = c.as_biguint();
        if v >= &n2 {
            return Err(CryptoError::Decryption(
                "ciphertext outside [0, n^2)".into(),
            ));
        }
        if v.is_zero() || !v.gcd(&self.n).is_one() {
            return Err(CryptoError::Decryption(
                "ciphertext is not a unit modulo n^2".into(),
            ));
        }
        let u = v.modpow(&self.lambda, &n2);
        let l = l_function(&u, &self.n)
            .ok_or_else(|| CryptoError::Decryption("L(u) undefined".into()))?;
        Ok((l * &self.mu) % &self.n)
    }

    /// Decrypt and require the plaintext to be a `u64` token amount.
    pub fn decrypt_amount(&self, c: &Ciphertext) -> Result<Amount, CryptoError> {
        let m = self.decrypt(c)?;
        m.to_u64().map(Amount::new).ok_or_else(|| {
            CryptoError::PlaintextOutOfRange(format!("{}-bit plaintext", m.bits()))
        })
    }

    /// Whether this private key decrypts ciphertexts produced under `pk`.
    pub fn corresponds_to(&self, pk: &PublicKey) -> bool {
        if self.n != pk.n {
            return false;
        }
        let n2 = pk.n_squared();
        let u = pk.g.modpow(&self.lambda, &n2);
        match l_function(&u, &self.n) {
            Some(l) => ((l * &self.mu) % &self.n).is_one(),
            None => false,
        }
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        wipe(&mut self.lambda);
        wipe(&mut self.mu);
        wipe(&mut self.n);
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl std::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrivateKey({}-bit, [REDACTED])", self.n.bits())
    }
}

// ---------------------------------------------------------------------------
// Key pair
// ---------------------------------------------------------------------------

/// A Paillier key pair.
#[derive(Clone)]
pub struct KeyPair {
    public: PublicKey,
    private: PrivateKey,
}

impl KeyPair {
    /// Generate a key pair whose modulus has exactly `bits` bits.
    ///
    /// `bits` must be even and at least [`MIN_KEY_BITS`]. Candidate prime
    /// pairs are redrawn when `p == q`, when `gcd(n, (p-1)(q-1)) != 1`, or
    /// when `mu` does not exist, up to [`MAX_KEYGEN_ATTEMPTS`] times.
    pub fn generate<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> Result<Self, CryptoError> {
        if bits < MIN_KEY_BITS || bits % 2 != 0 {
            return Err(CryptoError::KeyGeneration(format!(
                "key size must be even and at least {MIN_KEY_BITS} bits, got {bits}"
            )));
        }
        for _ in 0..MAX_KEYGEN_ATTEMPTS {
            let p = generate_prime(bits / 2, rng)?;
            let q = generate_prime(bits / 2, rng)?;
            match Self::from_primes(&p, &q) {
                Ok(kp) if kp.public.bits() == bits => return Ok(kp),
                _ => continue,
            }
        }
        Err(CryptoError::KeyGeneration(format!(
            "no valid {bits}-bit key after {MAX_KEYGEN_ATTEMPTS} attempts"
        )))
    }

    /// Derive a key pair from two distinct primes. Primality is not checked.
    pub fn from_primes(p: &BigUint, q: &BigUint) -> Result<Self, CryptoError> {
        if p == q {
            return Err(CryptoError::KeyGeneration("p and q must differ".into()));
        }
        let one = BigUint::one();
        if p <= &one || q <= &one {
            return Err(CryptoError::KeyGeneration("primes must exceed one".into()));
        }
        let n = p * q;
        let p1 = p - 1u32;
        let q1 = q - 1u32;
        let phi = &p1 * &q1;
        if !n.gcd(&phi).is_one() {
            return Err(CryptoError::KeyGeneration(
                "gcd(n, (p-1)(q-1)) != 1".into(),
            ));
        }
        let lambda = p1.lcm(&q1);
        let g = &n + 1u32;
        let n2 = &n * &n;
        let u = g.modpow(&lambda, &n2);
        let mu = l_function(&u, &n)
            .and_then(|l| mod_inverse(&l, &n))
            .ok_or_else(|| CryptoError::KeyGeneration("mu does not exist".into()))?;

        let public = PublicKey::new(g, n.clone())?;
        Ok(Self {
            public,
            private: PrivateKey { lambda, mu, n },
        })
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("private", &"[REDACTED]")
            .finish()
    }
}
