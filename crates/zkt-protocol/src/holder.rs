//! Account holder: an address plus the Paillier key pair that encrypts its
//! balance. The private key never leaves the holder except as a transfer
//! witness.

use rand::Rng;
use zkt_core::{Address, Amount};
use zkt_crypto::{Ciphertext, CryptoError, KeyPair, PrivateKey, PublicKey};

#[derive(Clone)]
pub struct AccountHolder {
    address: Address,
    keys: KeyPair,
}

impl AccountHolder {
    pub fn new(address: Address, keys: KeyPair) -> Self {
        Self { address, keys }
    }

    /// Fresh random address with a fresh `bits`-bit key pair.
    pub fn generate<R: Rng + ?Sized>(bits: u64, rng: &mut R) -> Result<Self, CryptoError> {
        let keys = KeyPair::generate(bits, rng)?;
        Ok(Self::new(Address::random(), keys))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> &PublicKey {
        self.keys.public_key()
    }

    pub(crate) fn private_key(&self) -> &PrivateKey {
        self.keys.private_key()
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    /// Decrypt a balance ciphertext read from the ledger.
    pub fn decrypt_balance(&self, balance: &Ciphertext) -> Result<Amount, CryptoError> {
        self.keys.private_key().decrypt_amount(balance)
    }
}

impl std::fmt::Debug for AccountHolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountHolder")
            .field("address", &self.address)
            .field("key_bits", &self.public_key().bits())
            .finish_non_exhaustive()
    }
}
