use std::fmt;

use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;
use thk_primitives::{keccak256, numeric::decode_hex, Address, HexError};

/// Key construction errors
#[derive(Debug, Error, PartialEq)]
pub enum KeyError {
    /// Private key is not valid hex
    #[error(transparent)]
    Hex(#[from] HexError),
    /// Private key is zero, too long or not below the curve order
    #[error("invalid private key")]
    InvalidPrivateKey,
    /// Public key bytes are not a point on the curve
    #[error("invalid public key")]
    InvalidPublicKey,
}

/// Uncompressed public key without the SEC1 `0x04` tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 64]);

impl PublicKey {
    /// Wrap raw `x ‖ y` coordinates. The point is not checked.
    pub const fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    /// Raw `x ‖ y`.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// `0x04` followed by the 128 hex digits of `x ‖ y`.
    pub fn to_sec1_hex(&self) -> String {
        format!("0x04{}", hex::encode(self.0))
    }

    /// Address owning this key.
    pub fn address(&self) -> Address {
        derive_address(self)
    }

    pub(crate) fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let mut bytes = [0u8; 64];
        // skip the 0x04 tag
        bytes.copy_from_slice(&point.as_bytes()[1..]);
        Self(bytes)
    }

    pub(crate) fn to_verifying_key(self) -> Result<VerifyingKey, KeyError> {
        let mut sec1 = [0u8; 65];
        sec1[0] = 0x04;
        sec1[1..].copy_from_slice(&self.0);
        VerifyingKey::from_sec1_bytes(&sec1).map_err(|_| KeyError::InvalidPublicKey)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(0x{})", hex::encode(self.0))
    }
}

/// Lower 20 bytes of `keccak256(x ‖ y)`.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let digest = keccak256(public_key.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::new(bytes)
}

/// A secp256k1 private scalar and its public point.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
    public_key: PublicKey,
}

impl KeyPair {
    /// Draw a fresh key from the operating system RNG.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Build from a 32-byte big-endian scalar.
    pub fn from_private_key(bytes: &[u8]) -> Result<Self, KeyError> {
        let signing_key = SigningKey::from_slice(bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_signing_key(signing_key))
    }

    /// Build from hex, with or without `0x`. Short keys are left-padded.
    pub fn from_private_key_hex(input: &str) -> Result<Self, KeyError> {
        let bytes = decode_hex(input)?;
        if bytes.len() > 32 {
            return Err(KeyError::InvalidPrivateKey);
        }
        let mut padded = [0u8; 32];
        padded[32 - bytes.len()..].copy_from_slice(&bytes);
        Self::from_private_key(&padded)
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let public_key = PublicKey::from_verifying_key(signing_key.verifying_key());
        Self { signing_key, public_key }
    }

    /// Private scalar, big-endian.
    pub fn private_key_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(&self.signing_key.to_bytes());
        out
    }

    /// Public key.
    pub const fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Address derived from the public key.
    pub fn address(&self) -> Address {
        derive_address(&self.public_key)
    }

    pub(crate) const fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").field("public_key", &self.public_key).finish_non_exhaustive()
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key == other.public_key
    }
}

impl Eq for KeyPair {}
