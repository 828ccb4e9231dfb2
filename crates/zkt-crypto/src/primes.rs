//! # Prime Generation
//!
//! Miller-Rabin probable-prime testing with trial division by small primes,
//! and random prime generation with the top two bits set so that the product
//! of two `b`-bit primes has exactly `2b` bits.

use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand::Rng;

use crate::error::CryptoError;

/// Miller-Rabin rounds. Error probability is at most `4^-rounds`.
pub const MILLER_RABIN_ROUNDS: usize = 40;

/// Upper bound on random candidates tried per prime.
pub const MAX_PRIME_CANDIDATES: usize = 10_000;

const SMALL_PRIMES: [u32; 16] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

/// Probabilistic primality test.
pub fn is_probable_prime<R: Rng + ?Sized>(n: &BigUint, rounds: usize, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }

    // n > 53 here, so [2, n - 1) is non-empty.
    let n_minus_one = n - 1u32;
    let s = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> s;

    'witness: for _ in 0..rounds {
        let a = rng.gen_biguint_range(&two, &n_minus_one);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

/// Generate a random prime of exactly `bits` bits.
pub fn generate_prime<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> Result<BigUint, CryptoError> {
    if bits < 3 {
        return Err(CryptoError::KeyGeneration(format!(
            "prime bit length must be at least 3, got {bits}"
        )));
    }
    let top_bits = (BigUint::one() << (bits - 1)) | (BigUint::one() << (bits - 2)) | BigUint::one();
    for _ in 0..MAX_PRIME_CANDIDATES {
        let candidate = rng.gen_biguint(bits) | &top_bits;
        if is_probable_prime(&candidate, MILLER_RABIN_ROUNDS, rng) {
            return Ok(candidate);
        }
    }
    Err(CryptoError::KeyGeneration(format!(
        "no {bits}-bit prime found in {MAX_PRIME_CANDIDATES} candidates"
    )))
}
