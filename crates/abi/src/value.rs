use alloy_primitives::{I256, U256};
use thk_primitives::Address;

use crate::{error::EncodeError, types::AbiType};

/// A typed ABI value.
///
/// Arrays carry their element type so that empty arrays still have a
/// signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbiValue {
    /// `bool`
    Bool(bool),
    /// `uintN` with its bit width
    Uint(U256, usize),
    /// `intN` with its bit width
    Int(I256, usize),
    /// `address`
    Address(Address),
    /// `bytesK`, the length is K
    FixedBytes(Vec<u8>),
    /// `bytes`
    Bytes(Vec<u8>),
    /// `string`
    String(String),
    /// `T[K]`
    FixedArray(AbiType, Vec<AbiValue>),
    /// `T[]`
    Array(AbiType, Vec<AbiValue>),
    /// `(T1,T2,...)`, fields keyed by position
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    /// `uint256`
    pub fn uint256(value: impl Into<U256>) -> Self {
        Self::Uint(value.into(), 256)
    }

    /// `int256`
    pub fn int256(value: I256) -> Self {
        Self::Int(value, 256)
    }

    /// `bytes32` from a 32-byte array.
    pub fn bytes32(value: [u8; 32]) -> Self {
        Self::FixedBytes(value.to_vec())
    }

    /// Type descriptor of this value.
    pub fn abi_type(&self) -> AbiType {
        match self {
            Self::Bool(_) => AbiType::Bool,
            Self::Uint(_, bits) => AbiType::Uint(*bits),
            Self::Int(_, bits) => AbiType::Int(*bits),
            Self::Address(_) => AbiType::Address,
            Self::FixedBytes(bytes) => AbiType::FixedBytes(bytes.len()),
            Self::Bytes(_) => AbiType::Bytes,
            Self::String(_) => AbiType::String,
            Self::FixedArray(elem, values) => AbiType::FixedArray(Box::new(elem.clone()), values.len()),
            Self::Array(elem, _) => AbiType::Array(Box::new(elem.clone())),
            Self::Tuple(fields) => AbiType::Tuple(fields.iter().map(Self::abi_type).collect()),
        }
    }

    /// Canonical type string such as `uint256` or `(uint256,string)`.
    pub fn type_signature(&self) -> String {
        self.abi_type().canonical()
    }

    /// See [`AbiType::is_dynamic`].
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::Bytes(_) | Self::String(_) | Self::Array(..) => true,
            Self::FixedArray(elem, _) => elem.is_dynamic(),
            Self::Tuple(fields) => fields.iter().any(Self::is_dynamic),
            _ => false,
        }
    }

    /// Check widths, lengths and that array elements match their declared
    /// element type.
    pub fn validate(&self) -> Result<(), EncodeError> {
        let out_of_range = || EncodeError::ValueOutOfRange(self.type_signature());
        match self {
            Self::Uint(value, bits) => {
                if !valid_width(*bits) || value.bit_len() > *bits {
                    return Err(out_of_range());
                }
            }
            Self::Int(value, bits) => {
                if !valid_width(*bits) || !fits_signed(*value, *bits) {
                    return Err(out_of_range());
                }
            }
            Self::FixedBytes(bytes) => {
                if !(1..=32).contains(&bytes.len()) {
                    return Err(out_of_range());
                }
            }
            Self::FixedArray(elem, values) | Self::Array(elem, values) => {
                if matches!(self, Self::FixedArray(..)) && values.is_empty() {
                    return Err(out_of_range());
                }
                for value in values {
                    let found = value.abi_type();
                    if &found != elem {
                        return Err(EncodeError::TypeMismatch {
                            expected: elem.canonical(),
                            found: found.canonical(),
                        });
                    }
                    value.validate()?;
                }
            }
            Self::Tuple(fields) => {
                for field in fields {
                    field.validate()?;
                }
            }
            Self::Bool(_) | Self::Address(_) | Self::Bytes(_) | Self::String(_) => {}
        }
        Ok(())
    }

    /// Boolean payload.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Unsigned integer payload.
    pub const fn as_uint(&self) -> Option<U256> {
        match self {
            Self::Uint(value, _) => Some(*value),
            _ => None,
        }
    }

    /// Signed integer payload.
    pub const fn as_int(&self) -> Option<I256> {
        match self {
            Self::Int(value, _) => Some(*value),
            _ => None,
        }
    }

    /// Address payload.
    pub const fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(value) => Some(value),
            _ => None,
        }
    }

    /// Byte payload of `bytes` or `bytesK`.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::FixedBytes(bytes) | Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// String payload.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Elements of an array or fields of a tuple.
    pub fn as_slice(&self) -> Option<&[Self]> {
        match self {
            Self::FixedArray(_, values) | Self::Array(_, values) | Self::Tuple(values) => {
                Some(values)
            }
            _ => None,
        }
    }
}

const fn valid_width(bits: usize) -> bool {
    bits % 8 == 0 && bits >= 8 && bits <= 256
}

/// A two's-complement value fits `bits` when everything above bit
/// `bits - 1` is a copy of the sign bit.
pub(crate) fn fits_signed(value: I256, bits: usize) -> bool {
    let high = value.into_raw() >> (bits - 1);
    high.is_zero() || high == (U256::MAX >> (bits - 1))
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Address> for AbiValue {
    fn from(value: Address) -> Self {
        Self::Address(value)
    }
}

impl From<U256> for AbiValue {
    fn from(value: U256) -> Self {
        Self::uint256(value)
    }
}

impl From<String> for AbiValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for AbiValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}
