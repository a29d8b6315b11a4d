//! Keccak-256 hashing

use tiny_keccak::{Hasher, Keccak};

/// 32-byte hash type
pub type Hash = [u8; 32];

/// Keccak-256 of the empty input.
pub const EMPTY_HASH: Hash = [
    0xc5, 0xd2, 0x46, 0x01, 0x86, 0xf7, 0x23, 0x3c,
    0x92, 0x7e, 0x7d, 0xb2, 0xdc, 0xc7, 0x03, 0xc0,
    0xe5, 0x00, 0xb6, 0x53, 0xca, 0x82, 0x27, 0x3b,
    0x7b, 0xfa, 0xd8, 0x04, 0x5d, 0x85, 0xa4, 0x70,
];

/// Compute the Keccak-256 hash of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> Hash {
    let mut hasher = Keccak::v256();
    hasher.update(data.as_ref());
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Hash the UTF-8 bytes of `input` and render the digest as `0x`-prefixed hex.
pub fn keccak256_hex(input: &str) -> String {
    format!("0x{}", hex::encode(keccak256(input.as_bytes())))
}
