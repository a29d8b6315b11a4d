//! Key management and signing.
//!
//! Signatures are plain secp256k1 ECDSA over a 32-byte Keccak-256 digest.
//! The recovery id is found after signing by trying each candidate and
//! comparing the recovered key with the signer's own public key.

mod credentials;
mod keys;
mod signature;

pub use credentials::Credentials;
pub use keys::{derive_address, KeyError, KeyPair, PublicKey};
pub use signature::{recover_public_key, sign, Signature, SigningError};
