use thk_primitives::{keccak256, Address, Hash};

use crate::{
    keys::{KeyError, KeyPair},
    signature::{sign, Signature, SigningError},
};

/// A key pair bound to its address.
///
/// Read-only after construction; share it behind an `Arc` to sign from
/// several tasks at once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    key_pair: KeyPair,
    address: Address,
}

impl Credentials {
    /// Wrap an existing key pair.
    pub fn new(key_pair: KeyPair) -> Self {
        let address = key_pair.address();
        Self { key_pair, address }
    }

    /// Fresh random credentials.
    pub fn generate() -> Self {
        Self::new(KeyPair::generate())
    }

    /// Load from a hex private key.
    pub fn from_private_key_hex(input: &str) -> Result<Self, KeyError> {
        KeyPair::from_private_key_hex(input).map(Self::new)
    }

    /// Signer address.
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// Underlying key pair.
    pub const fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Public key as sent in the `pub` field of a transaction.
    pub fn public_key_hex(&self) -> String {
        self.key_pair.public_key().to_sec1_hex()
    }

    /// Sign a precomputed digest.
    pub fn sign_hash(&self, hash: &Hash) -> Result<Signature, SigningError> {
        sign(&self.key_pair, hash)
    }

    /// Hash the UTF-8 bytes of `message`, then sign.
    pub fn sign_message(&self, message: &str) -> Result<Signature, SigningError> {
        self.sign_hash(&keccak256(message.as_bytes()))
    }
}

impl From<KeyPair> for Credentials {
    fn from(key_pair: KeyPair) -> Self {
        Self::new(key_pair)
    }
}
