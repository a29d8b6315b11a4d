//! Account addresses
//!
//! An address is the lower 20 bytes of the Keccak-256 hash of an
//! uncompressed public key. Its canonical text form carries a mixed-case
//! checksum: hex digit `i` is uppercased when nibble `i` of
//! `keccak256(lowercase_hex)` is 8 or more.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{hash::keccak256, numeric::strip_hex_prefix};

/// Number of hex digits in a textual address.
pub const ADDRESS_HEX_LEN: usize = 40;

/// Address parsing errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// Wrong number of bytes or hex digits
    #[error("invalid address length: {0}")]
    InvalidLength(usize),
    /// Non-hex character
    #[error("invalid hex in address {0:?}")]
    InvalidHex(String),
    /// Mixed-case input whose casing does not match the checksum
    #[error("address checksum mismatch: {0}")]
    InvalidChecksum(String),
}

/// A 20-byte account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 20]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Wrap raw bytes.
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build from a slice that must be exactly 20 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AddressError> {
        let bytes: [u8; 20] =
            bytes.try_into().map_err(|_| AddressError::InvalidLength(bytes.len()))?;
        Ok(Self(bytes))
    }

    /// Raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase hex, no prefix. This is the form used inside transaction
    /// hashes.
    pub fn to_lower_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// `0x` + checksummed hex.
    pub fn to_checksum(&self) -> String {
        checksum_hex(&self.to_lower_hex())
    }
}

/// Apply the mixed-case checksum to 40 lowercase hex digits.
fn checksum_hex(lower: &str) -> String {
    let digest = keccak256(lower.as_bytes());
    let mut out = String::with_capacity(ADDRESS_HEX_LEN + 2);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = digest[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn is_mixed_case(digits: &str) -> bool {
    digits.chars().any(|c| c.is_ascii_lowercase()) && digits.chars().any(|c| c.is_ascii_uppercase())
}

/// Checksum an address given as text. Input case is ignored.
pub fn to_checksum_address(input: &str) -> Result<String, AddressError> {
    let digits = strip_hex_prefix(input);
    if digits.len() != ADDRESS_HEX_LEN {
        return Err(AddressError::InvalidLength(digits.len()));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidHex(input.to_string()));
    }
    Ok(checksum_hex(&digits.to_ascii_lowercase()))
}

/// Returns true if `input` is exactly the checksummed rendering of itself.
pub fn is_valid_checksum(input: &str) -> bool {
    match to_checksum_address(input) {
        Ok(expected) => strip_hex_prefix(&expected) == strip_hex_prefix(input),
        Err(_) => false,
    }
}

/// `^0x[0-9a-f]{40}$`
pub fn is_strict_address(input: &str) -> bool {
    input.len() == ADDRESS_HEX_LEN + 2
        && input.starts_with("0x")
        && input[2..].chars().all(|c| matches!(c, '0'..='9' | 'a'..='f'))
}

/// Lowercase, `0x`-prefixed and left-padded to 40 digits.
pub fn to_strict_address(input: &str) -> Result<String, AddressError> {
    let digits = strip_hex_prefix(input);
    if digits.len() > ADDRESS_HEX_LEN {
        return Err(AddressError::InvalidLength(digits.len()));
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::InvalidHex(input.to_string()));
    }
    Ok(format!("0x{:0>width$}", digits.to_ascii_lowercase(), width = ADDRESS_HEX_LEN))
}

/// Shape check, plus the checksum check when the input is mixed case.
pub fn is_address(input: &str) -> bool {
    input.parse::<Address>().is_ok()
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = strip_hex_prefix(s);
        if digits.len() != ADDRESS_HEX_LEN {
            return Err(AddressError::InvalidLength(digits.len()));
        }
        let bytes = hex::decode(digits).map_err(|_| AddressError::InvalidHex(s.to_string()))?;
        if is_mixed_case(digits) && !is_valid_checksum(digits) {
            return Err(AddressError::InvalidChecksum(s.to_string()));
        }
        Self::from_slice(&bytes)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", self.to_lower_hex()))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
