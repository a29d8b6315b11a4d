use std::fmt;

use k256::ecdsa::{
    signature::hazmat::PrehashSigner, RecoveryId, Signature as EcdsaSignature, VerifyingKey,
};
use thiserror::Error;
use thk_primitives::{numeric::decode_hex, Address, Hash, HexError};

use crate::keys::{derive_address, KeyPair, PublicKey};

/// Offset added to the recovery id in the serialized form.
const V_OFFSET: u8 = 27;

/// Signing errors
#[derive(Debug, Error, PartialEq)]
pub enum SigningError {
    /// No recovery id reproduces the signer's public key
    #[error("could not construct a recoverable key, are the credentials valid?")]
    RecoveryFailed,
    /// The underlying ECDSA operation failed
    #[error("ecdsa signing failed")]
    Ecdsa,
    /// Serialized signature is not 65 bytes
    #[error("invalid signature length {0}")]
    InvalidLength(usize),
    /// Trailing byte is not a recovery id
    #[error("invalid recovery byte {0:#04x}")]
    InvalidRecoveryByte(u8),
    /// Serialized signature is not hex
    #[error(transparent)]
    Hex(#[from] HexError),
}

/// A recoverable ECDSA signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    /// `r` component, big-endian
    pub r: [u8; 32],
    /// `s` component, big-endian
    pub s: [u8; 32],
    /// 0..=3, usually 0 or 1
    pub recovery_id: u8,
}

impl Signature {
    /// Trailing byte of the serialized form, `27 + recovery_id`.
    pub const fn v(&self) -> u8 {
        V_OFFSET + self.recovery_id
    }

    /// `r ‖ s ‖ v`
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v();
        out
    }

    /// `0x` + hex of `r ‖ s ‖ v`.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    /// Parse `r ‖ s ‖ v`. Both `27..=30` and raw `0..=3` are accepted for `v`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
        if bytes.len() != 65 {
            return Err(SigningError::InvalidLength(bytes.len()));
        }
        let v = bytes[64];
        let recovery_id = match v {
            0..=3 => v,
            27..=30 => v - V_OFFSET,
            _ => return Err(SigningError::InvalidRecoveryByte(v)),
        };
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, recovery_id })
    }

    /// Parse the hex form produced by [`Signature::to_hex`].
    pub fn from_hex(input: &str) -> Result<Self, SigningError> {
        Self::from_bytes(&decode_hex(input)?)
    }

    /// Public key that produced this signature over `hash`.
    pub fn recover(&self, hash: &Hash) -> Option<PublicKey> {
        recover_public_key(self.recovery_id, &self.r, &self.s, hash)
    }

    /// Address that produced this signature over `hash`.
    pub fn recover_address(&self, hash: &Hash) -> Option<Address> {
        self.recover(hash).map(|key| derive_address(&key))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

/// Sign a 32-byte digest and work out the recovery id.
pub fn sign(key_pair: &KeyPair, hash: &Hash) -> Result<Signature, SigningError> {
    let signature: EcdsaSignature =
        key_pair.signing_key().sign_prehash(hash).map_err(|_| SigningError::Ecdsa)?;
    let bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);

    for recovery_id in 0..4u8 {
        if recover_public_key(recovery_id, &r, &s, hash).as_ref() == Some(key_pair.public_key()) {
            return Ok(Signature { r, s, recovery_id });
        }
    }
    tracing::error!(target: "thk_crypto", address = %key_pair.address(), "no recovery id matches signer");
    Err(SigningError::RecoveryFailed)
}

/// Standard ECDSA public key recovery. Returns `None` for an invalid
/// recovery id, out-of-range `r`/`s`, or a candidate point that does not
/// exist.
pub fn recover_public_key(
    recovery_id: u8,
    r: &[u8; 32],
    s: &[u8; 32],
    hash: &Hash,
) -> Option<PublicKey> {
    let id = RecoveryId::from_byte(recovery_id)?;
    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(r);
    rs[32..].copy_from_slice(s);
    let signature = EcdsaSignature::from_slice(&rs).ok()?;
    let key = VerifyingKey::recover_from_prehash(hash, &signature, id).ok()?;
    Some(PublicKey::from_verifying_key(&key))
}
