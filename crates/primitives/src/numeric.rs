//! Hex and big-integer helpers
//!
//! The RPC layer moves everything around as hex strings, sometimes with a
//! `0x` prefix and sometimes without. These helpers normalise that.

use alloy_primitives::U256;
use thiserror::Error;

/// Hex conversion errors
#[derive(Debug, Error, PartialEq)]
pub enum HexError {
    /// Input contains a non-hex character or has odd length
    #[error("invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// Input is not a valid hex number
    #[error("invalid hex number {0:?}")]
    InvalidNumber(String),
    /// Value needs more bytes than requested
    #[error("value needs {needed} bytes, only {available} available")]
    ValueTooLarge {
        /// Minimum byte length of the value
        needed: usize,
        /// Requested length
        available: usize,
    },
}

/// Returns true if `input` starts with `0x` or `0X`.
pub fn has_hex_prefix(input: &str) -> bool {
    input.starts_with("0x") || input.starts_with("0X")
}

/// Strip a leading `0x`/`0X` if present.
pub fn strip_hex_prefix(input: &str) -> &str {
    if has_hex_prefix(input) {
        &input[2..]
    } else {
        input
    }
}

/// Add a `0x` prefix unless one is already there.
pub fn prepend_hex_prefix(input: &str) -> String {
    if has_hex_prefix(input) {
        input.to_string()
    } else {
        format!("0x{input}")
    }
}

/// Decode a hex string, with or without prefix.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, HexError> {
    Ok(hex::decode(strip_hex_prefix(input))?)
}

/// Lowercase hex without prefix.
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(bytes)
}

/// Lowercase hex with `0x` prefix.
pub fn encode_hex_prefixed(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Left-pad `input` with `0` up to `width` characters.
pub fn pad_left(input: &str, width: usize) -> String {
    if input.len() >= width {
        input.to_string()
    } else {
        format!("{}{input}", "0".repeat(width - input.len()))
    }
}

/// Big-endian bytes of `value`, left-padded to exactly `len` bytes.
pub fn to_bytes_padded(value: &U256, len: usize) -> Result<Vec<u8>, HexError> {
    let needed = value.byte_len();
    if needed > len {
        return Err(HexError::ValueTooLarge { needed, available: len });
    }
    let word = value.to_be_bytes::<32>();
    let mut out = vec![0u8; len.saturating_sub(32)];
    out.extend_from_slice(&word[32 - len.min(32)..]);
    Ok(out)
}

/// Minimal `0x`-prefixed hex rendering (`0x0` for zero).
pub fn u256_to_hex(value: &U256) -> String {
    format!("0x{value:x}")
}

/// Parse a hex number, with or without prefix.
pub fn u256_from_hex(input: &str) -> Result<U256, HexError> {
    let digits = strip_hex_prefix(input);
    if digits.is_empty() {
        return Err(HexError::InvalidNumber(input.to_string()));
    }
    U256::from_str_radix(digits, 16).map_err(|_| HexError::InvalidNumber(input.to_string()))
}

/// Parse a decimal number.
pub fn u256_from_dec(input: &str) -> Result<U256, HexError> {
    if input.is_empty() {
        return Err(HexError::InvalidNumber(input.to_string()));
    }
    U256::from_str_radix(input, 10).map_err(|_| HexError::InvalidNumber(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_handling() {
        assert!(has_hex_prefix("0xab"));
        assert!(has_hex_prefix("0XAB"));
        assert!(!has_hex_prefix("ab"));
        assert_eq!(strip_hex_prefix("0xabcd"), "abcd");
        assert_eq!(strip_hex_prefix("abcd"), "abcd");
        assert_eq!(prepend_hex_prefix("abcd"), "0xabcd");
        assert_eq!(prepend_hex_prefix("0xabcd"), "0xabcd");
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex("0102").unwrap(), vec![1, 2]);
        assert_eq!(decode_hex("0x").unwrap(), Vec::<u8>::new());
        assert!(decode_hex("0x123").is_err());
        assert!(decode_hex("0xzz").is_err());
    }

    #[test]
    fn test_pad_left() {
        assert_eq!(pad_left("abc", 6), "000abc");
        assert_eq!(pad_left("abcdef", 3), "abcdef");
    }

    #[test]
    fn test_to_bytes_padded() {
        let value = U256::from(0x0102u64);
        assert_eq!(to_bytes_padded(&value, 4).unwrap(), vec![0, 0, 1, 2]);
        assert_eq!(to_bytes_padded(&value, 33).unwrap().len(), 33);
        assert_eq!(
            to_bytes_padded(&value, 1),
            Err(HexError::ValueTooLarge { needed: 2, available: 1 })
        );
    }

    #[test]
    fn test_u256_hex() {
        assert_eq!(u256_to_hex(&U256::ZERO), "0x0");
        assert_eq!(u256_to_hex(&U256::from(255u64)), "0xff");
        assert_eq!(u256_from_hex("0xff").unwrap(), U256::from(255u64));
        assert_eq!(u256_from_hex("FF").unwrap(), U256::from(255u64));
        assert!(u256_from_hex("0x").is_err());
        assert_eq!(
            u256_from_dec("1000000000000000000").unwrap(),
            U256::from(1_000_000_000_000_000_000u64)
        );
    }
}
