//! Modular arithmetic helpers shared by key generation and decryption.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};

/// Multiplicative inverse of `a` modulo `m`, if it exists.
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let a = BigInt::from_biguint(Sign::Plus, a % m);
    let modulus = BigInt::from_biguint(Sign::Plus, m.clone());
    let ext = a.extended_gcd(&modulus);
    if !ext.gcd.is_one() {
        return None;
    }
    ext.x.mod_floor(&modulus).to_biguint()
}

/// Paillier's `L(u) = (u - 1) / n`. Returns `None` for `u = 0`.
pub fn l_function(u: &BigUint, n: &BigUint) -> Option<BigUint> {
    if u.is_zero() || n.is_zero() {
        return None;
    }
    Some((u - 1u32) / n)
}

/// Overwrite the limbs of a big integer in place and leave it at zero.
///
/// `assign_from_slice` reuses the existing allocation, so the previous limbs
/// are overwritten rather than left behind in freed memory.
pub fn wipe(value: &mut BigUint) {
    let digits = value.iter_u32_digits().len();
    value.assign_from_slice(&vec![0u32; digits]);
    value.set_zero();
}
