//! Direct IBAN encoding of addresses
//!
//! The address is written in base 36, left-padded to 30 characters and
//! prefixed with the `TH` country code plus two ISO 7064 mod-97-10 check
//! digits.

use alloy_primitives::U256;
use thiserror::Error;

use crate::address::Address;

/// Country code used by every Thinkium IBAN.
pub const COUNTRY_CODE: &str = "TH";

const BBAN_LEN: usize = 30;

/// IBAN conversion errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IbanError {
    /// Only 34 and 35 character codes carry an address directly
    #[error("not a direct IBAN (length {0})")]
    NotDirect(usize),
    /// Character outside `[0-9A-Za-z]`
    #[error("invalid base-36 character {0:?}")]
    InvalidCharacter(char),
    /// Decoded number does not fit in 20 bytes
    #[error("IBAN value exceeds address range")]
    Overflow,
}

/// Move the first four characters to the end and expand letters to
/// numbers (`A` = 10 .. `Z` = 35).
fn iso13616_prepare(iban: &str) -> String {
    let upper = iban.to_ascii_uppercase();
    let (head, rest) = upper.split_at(4.min(upper.len()));
    let mut out = String::with_capacity(upper.len() * 2);
    for c in rest.chars().chain(head.chars()) {
        if c.is_ascii_uppercase() {
            out.push_str(&(u32::from(c) - u32::from('A') + 10).to_string());
        } else {
            out.push(c);
        }
    }
    out
}

/// ISO 7064 mod-97-10 over a string of decimal digits.
fn mod97(digits: &str) -> Option<u32> {
    digits.chars().try_fold(0u32, |acc, c| Some((acc * 10 + c.to_digit(10)?) % 97))
}

fn to_base36(mut value: U256) -> String {
    const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let radix = U256::from(36u8);
    let mut digits = Vec::new();
    loop {
        let rem = value % radix;
        digits.push(ALPHABET[rem.as_limbs()[0] as usize]);
        value /= radix;
        if value.is_zero() {
            break;
        }
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

fn from_base36(input: &str) -> Result<U256, IbanError> {
    let radix = U256::from(36u8);
    input.chars().try_fold(U256::ZERO, |acc, c| {
        let digit = c.to_digit(36).ok_or(IbanError::InvalidCharacter(c))?;
        acc.checked_mul(radix)
            .and_then(|v| v.checked_add(U256::from(digit)))
            .ok_or(IbanError::Overflow)
    })
}

/// Prefix a basic bank account number with country code and check digits.
pub fn from_bban(bban: &str) -> String {
    let remainder = mod97(&iso13616_prepare(&format!("{COUNTRY_CODE}00{bban}"))).unwrap_or(0);
    format!("{COUNTRY_CODE}{:02}{bban}", 98 - remainder)
}

/// Encode an address as a direct IBAN.
pub fn from_address(address: &Address) -> String {
    let value = U256::from_be_slice(address.as_bytes());
    let base36 = to_base36(value);
    from_bban(&format!("{base36:0>BBAN_LEN$}").to_ascii_uppercase())
}

/// Decode a direct IBAN (34 or 35 characters, any case) back to an address.
pub fn to_address(iban: &str) -> Result<Address, IbanError> {
    if !is_direct(iban) {
        return Err(IbanError::NotDirect(iban.len()));
    }
    if let Some(c) = iban.chars().find(|c| !c.is_ascii()) {
        return Err(IbanError::InvalidCharacter(c));
    }
    let value = from_base36(&iban[4..])?;
    if value.bit_len() > 160 {
        return Err(IbanError::Overflow);
    }
    let word = value.to_be_bytes::<32>();
    Address::from_slice(&word[12..]).map_err(|_| IbanError::Overflow)
}

/// Direct IBANs embed the full address.
pub fn is_direct(iban: &str) -> bool {
    matches!(iban.len(), 34 | 35)
}

/// `^TH[0-9]{2}[0-9A-Z]{30,31}$` with a valid mod-97 checksum.
pub fn is_valid(iban: &str) -> bool {
    let well_formed = iban.is_ascii()
        && iban.starts_with(COUNTRY_CODE)
        && is_direct(iban)
        && iban[2..4].chars().all(|c| c.is_ascii_digit())
        && iban[4..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase());
    well_formed && mod97(&iso13616_prepare(iban)) == Some(1)
}
