use std::iter;

use alloy_primitives::{I256, U256};
use thk_primitives::{numeric::decode_hex as hex_to_bytes, Address};

use crate::{error::DecodeError, types::AbiType, value::{fits_signed, AbiValue}, WORD_SIZE};

fn malformed(reason: impl Into<String>) -> DecodeError {
    DecodeError::Malformed(reason.into())
}

fn read_word(data: &[u8], at: usize) -> Result<&[u8], DecodeError> {
    at.checked_add(WORD_SIZE)
        .and_then(|end| data.get(at..end))
        .ok_or_else(|| malformed(format!("word at {at} exceeds {} bytes of data", data.len())))
}

/// Read a length or offset word.
fn read_usize(data: &[u8], at: usize) -> Result<usize, DecodeError> {
    let value = U256::from_be_slice(read_word(data, at)?);
    if value > U256::from(usize::MAX) {
        return Err(malformed(format!("length or offset {value} at {at} is too large")));
    }
    Ok(value.as_limbs()[0] as usize)
}

/// Walks one payload. Every word a value is read from is charged against
/// `budget`, which starts at the payload's word count, so offsets that point
/// back into already decoded regions cannot inflate the output.
struct Decoder<'a> {
    data: &'a [u8],
    budget: usize,
}

impl<'a> Decoder<'a> {
    const fn new(data: &'a [u8]) -> Self {
        Self { data, budget: data.len() / WORD_SIZE }
    }

    fn charge(&mut self, words: usize) -> Result<(), DecodeError> {
        self.budget = self
            .budget
            .checked_sub(words)
            .ok_or_else(|| malformed("decoded size exceeds the payload, offsets overlap"))?;
        Ok(())
    }

    fn word(&mut self, at: usize) -> Result<&'a [u8], DecodeError> {
        let word = read_word(self.data, at)?;
        self.charge(1)?;
        Ok(word)
    }

    fn length(&mut self, at: usize) -> Result<usize, DecodeError> {
        let len = read_usize(self.data, at)?;
        self.charge(1)?;
        Ok(len)
    }

    /// Decode a head/tail block starting at `base`.
    fn sequence<'t>(
        &mut self,
        base: usize,
        types: impl IntoIterator<Item = &'t AbiType>,
    ) -> Result<Vec<AbiValue>, DecodeError> {
        let mut values = Vec::new();
        let mut cursor = base;
        for ty in types {
            if ty.is_dynamic() {
                let offset = read_usize(self.data, cursor)?;
                let start = base
                    .checked_add(offset)
                    .filter(|start| *start <= self.data.len())
                    .ok_or_else(|| malformed(format!("offset {offset} at {cursor} is out of range")))?;
                values.push(self.value(start, ty)?);
                cursor += WORD_SIZE;
            } else {
                values.push(self.value(cursor, ty)?);
                cursor = cursor
                    .checked_add(ty.head_size())
                    .ok_or_else(|| malformed("static size overflow"))?;
            }
        }
        Ok(values)
    }

    fn blob(&mut self, at: usize) -> Result<&'a [u8], DecodeError> {
        let len = self.length(at)?;
        let start = at + WORD_SIZE;
        let payload = start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or_else(|| malformed(format!("payload of {len} bytes at {start} is truncated")))?;
        self.charge(len.div_ceil(WORD_SIZE))?;
        Ok(payload)
    }

    fn value(&mut self, at: usize, ty: &AbiType) -> Result<AbiValue, DecodeError> {
        match ty {
            AbiType::Bool => match U256::from_be_slice(self.word(at)?) {
                v if v.is_zero() => Ok(AbiValue::Bool(false)),
                v if v == U256::from(1u8) => Ok(AbiValue::Bool(true)),
                v => Err(malformed(format!("invalid bool word {v}"))),
            },
            AbiType::Uint(bits) => {
                let value = U256::from_be_slice(self.word(at)?);
                if value.bit_len() > *bits {
                    return Err(malformed(format!("value does not fit uint{bits}")));
                }
                Ok(AbiValue::Uint(value, *bits))
            }
            AbiType::Int(bits) => {
                let value = I256::from_raw(U256::from_be_slice(self.word(at)?));
                if !fits_signed(value, *bits) {
                    return Err(malformed(format!("value does not fit int{bits}")));
                }
                Ok(AbiValue::Int(value, *bits))
            }
            AbiType::Address => {
                let (padding, bytes) = self.word(at)?.split_at(WORD_SIZE - 20);
                if !is_zero(padding) {
                    return Err(malformed("address word has non-zero high bytes"));
                }
                let address = Address::from_slice(bytes).map_err(|e| malformed(e.to_string()))?;
                Ok(AbiValue::Address(address))
            }
            AbiType::FixedBytes(len) => {
                let word = self.word(at)?;
                if *len > WORD_SIZE {
                    return Err(malformed(format!("bytes{len} exceeds a word")));
                }
                let (bytes, padding) = word.split_at(*len);
                if !is_zero(padding) {
                    return Err(malformed(format!("bytes{len} word has non-zero padding")));
                }
                Ok(AbiValue::FixedBytes(bytes.to_vec()))
            }
            AbiType::Bytes => Ok(AbiValue::Bytes(self.blob(at)?.to_vec())),
            AbiType::String => {
                let bytes = self.blob(at)?;
                let text = String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)?;
                Ok(AbiValue::String(text))
            }
            AbiType::FixedArray(elem, len) => {
                let values = self.sequence(at, iter::repeat(elem.as_ref()).take(*len))?;
                Ok(AbiValue::FixedArray(elem.as_ref().clone(), values))
            }
            AbiType::Array(elem) => {
                let len = self.length(at)?;
                let start = at + WORD_SIZE;
                // every element takes at least one head word
                let available = self.data.len().saturating_sub(start) / WORD_SIZE;
                if len > available {
                    return Err(malformed(format!("array length {len} exceeds remaining data")));
                }
                // zero-sized elements read no words of their own
                if !elem.is_dynamic() && elem.head_size() == 0 {
                    self.charge(len)?;
                }
                let values = self.sequence(start, iter::repeat(elem.as_ref()).take(len))?;
                Ok(AbiValue::Array(elem.as_ref().clone(), values))
            }
            AbiType::Tuple(fields) => Ok(AbiValue::Tuple(self.sequence(at, fields)?)),
        }
    }
}

fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| *b == 0)
}

/// Decode a head/tail block into values of the given types.
pub fn decode(data: &[u8], types: &[AbiType]) -> Result<Vec<AbiValue>, DecodeError> {
    Decoder::new(data).sequence(0, types)
}

/// Decode hex return data. An empty payload (`0x` or `""`) yields no values.
pub fn decode_hex(input: &str, types: &[AbiType]) -> Result<Vec<AbiValue>, DecodeError> {
    let data = hex_to_bytes(input)?;
    if data.is_empty() {
        return Ok(Vec::new());
    }
    decode(&data, types)
}
