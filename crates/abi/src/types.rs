use std::{fmt, str::FromStr};

use crate::{error::EncodeError, WORD_SIZE};

/// An ABI type descriptor.
///
/// Integer widths are data: `Uint(64)` is `uint64`. Tuples are identified
/// by their ordered component types only, field names play no part.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// `bool`
    Bool,
    /// `uintN`, N in 8..=256 step 8
    Uint(usize),
    /// `intN`, N in 8..=256 step 8
    Int(usize),
    /// `address`
    Address,
    /// `bytesK`, K in 1..=32
    FixedBytes(usize),
    /// `bytes`
    Bytes,
    /// `string`
    String,
    /// `T[K]`
    FixedArray(Box<AbiType>, usize),
    /// `T[]`
    Array(Box<AbiType>),
    /// `(T1,T2,...)`
    Tuple(Vec<AbiType>),
}

fn parse_width(digits: &str, full: &str) -> Result<usize, EncodeError> {
    if digits.is_empty() {
        return Ok(256);
    }
    match digits.parse::<usize>() {
        Ok(bits) if bits % 8 == 0 && (8..=256).contains(&bits) && !digits.starts_with('0') => {
            Ok(bits)
        }
        _ => Err(EncodeError::UnsupportedType(full.to_string())),
    }
}

/// Split a tuple body on top-level commas.
fn split_components(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

impl AbiType {
    /// Parse a canonical type string such as `uint256`, `(address,bytes)[]`
    /// or `string[2]`.
    pub fn parse(input: &str) -> Result<Self, EncodeError> {
        let unsupported = || EncodeError::UnsupportedType(input.to_string());
        let s = input.trim();

        if let Some(prefix) = s.strip_suffix(']') {
            let open = prefix.rfind('[').ok_or_else(unsupported)?;
            let inner = Self::parse(&prefix[..open])?;
            let size = &prefix[open + 1..];
            if size.is_empty() {
                return Ok(Self::Array(Box::new(inner)));
            }
            let len = size.parse::<usize>().map_err(|_| unsupported())?;
            if len == 0 {
                return Err(unsupported());
            }
            return Ok(Self::FixedArray(Box::new(inner), len));
        }

        if let Some(body) = s.strip_prefix('(').and_then(|rest| rest.strip_suffix(')')) {
            if body.trim().is_empty() {
                return Ok(Self::Tuple(Vec::new()));
            }
            return split_components(body)
                .into_iter()
                .map(Self::parse)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Tuple);
        }

        match s {
            "bool" => Ok(Self::Bool),
            "address" => Ok(Self::Address),
            "string" => Ok(Self::String),
            "bytes" => Ok(Self::Bytes),
            _ => {
                if let Some(digits) = s.strip_prefix("uint") {
                    parse_width(digits, input).map(Self::Uint)
                } else if let Some(digits) = s.strip_prefix("int") {
                    parse_width(digits, input).map(Self::Int)
                } else if let Some(digits) = s.strip_prefix("bytes") {
                    match digits.parse::<usize>() {
                        Ok(len) if (1..=32).contains(&len) && !digits.starts_with('0') => {
                            Ok(Self::FixedBytes(len))
                        }
                        _ => Err(unsupported()),
                    }
                } else {
                    Err(unsupported())
                }
            }
        }
    }

    /// Canonical type string, as hashed into selectors.
    pub fn canonical(&self) -> String {
        match self {
            Self::Bool => "bool".to_string(),
            Self::Uint(bits) => format!("uint{bits}"),
            Self::Int(bits) => format!("int{bits}"),
            Self::Address => "address".to_string(),
            Self::FixedBytes(len) => format!("bytes{len}"),
            Self::Bytes => "bytes".to_string(),
            Self::String => "string".to_string(),
            Self::FixedArray(inner, len) => format!("{}[{len}]", inner.canonical()),
            Self::Array(inner) => format!("{}[]", inner.canonical()),
            Self::Tuple(fields) => {
                let parts: Vec<String> = fields.iter().map(Self::canonical).collect();
                format!("({})", parts.join(","))
            }
        }
    }

    /// Whether the encoded length depends on the value.
    pub fn is_dynamic(&self) -> bool {
        match self {
            Self::Bytes | Self::String | Self::Array(_) => true,
            Self::FixedArray(inner, _) => inner.is_dynamic(),
            Self::Tuple(fields) => fields.iter().any(Self::is_dynamic),
            _ => false,
        }
    }

    /// Bytes this type occupies in its parent's head.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD_SIZE;
        }
        match self {
            Self::FixedArray(inner, len) => inner.head_size().saturating_mul(*len),
            Self::Tuple(fields) => fields.iter().map(Self::head_size).sum(),
            _ => WORD_SIZE,
        }
    }

    /// Strip array dimensions, `(uint8,bool)[][2]` gives `(uint8,bool)`.
    pub fn base(&self) -> &Self {
        match self {
            Self::FixedArray(inner, _) | Self::Array(inner) => inner.base(),
            _ => self,
        }
    }

    /// Tuple nesting depth: 0 for non-tuples, 1 for a flat tuple.
    pub fn nesting_depth(&self) -> usize {
        match self.base() {
            Self::Tuple(fields) => 1 + fields.iter().map(Self::nesting_depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

impl FromStr for AbiType {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
