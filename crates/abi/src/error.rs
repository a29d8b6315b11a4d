use thiserror::Error;
use thk_primitives::HexError;

/// Errors raised while building call data
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Type string not recognised
    #[error("unsupported ABI type {0:?}")]
    UnsupportedType(String),
    /// Value does not match the declared type
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// Declared type
        expected: String,
        /// Type of the supplied value
        found: String,
    },
    /// Integer does not fit its declared width or a blob has the wrong size
    #[error("value out of range for {0}")]
    ValueOutOfRange(String),
    /// Wrong number of arguments
    #[error("expected {expected} values, got {actual}")]
    ArityMismatch {
        /// Number of declared parameters
        expected: usize,
        /// Number of supplied values
        actual: usize,
    },
}

/// Errors raised while decoding return data or logs
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    /// Truncated data, out-of-range offset or a word that is not a valid
    /// encoding of its type
    #[error("malformed ABI data: {0}")]
    Malformed(String),
    /// String payload is not UTF-8
    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,
    /// Input is not hex
    #[error(transparent)]
    Hex(#[from] HexError),
}

/// Errors raised while loading a JSON contract interface
#[derive(Debug, Error)]
pub enum AbiParseError {
    /// Invalid JSON
    #[error("invalid ABI json: {0}")]
    Json(#[from] serde_json::Error),
    /// A parameter type could not be resolved
    #[error(transparent)]
    Type(#[from] EncodeError),
}
