use std::time::Duration;

use thiserror::Error;
use thk_abi::{DecodeError, EncodeError};
use thk_crypto::{KeyError, SigningError};
use thk_primitives::HexError;

/// Failure to deliver a request or read its response
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP layer failure
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Response body is not the expected JSON
    #[error("invalid response json: {0}")]
    Json(#[from] serde_json::Error),
    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the transaction lifecycle
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Request never produced a usable response
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// The node answered with an error other than "not found"
    #[error("Error processing request: {message} (code {code})")]
    Chain {
        /// Node error code
        code: i64,
        /// Node error message
        message: String,
    },
    /// Submission failed in transit; the transaction may still exist under
    /// `local_hash`
    #[error("failed to submit transaction {local_hash}: {source}")]
    Submission {
        /// Hash computed before sending
        local_hash: String,
        /// Underlying failure
        source: TransportError,
    },
    /// Attempt budget spent without a receipt
    #[error("Transaction receipt was not generated after {} seconds for transaction: {hash}", elapsed.as_secs())]
    ConfirmationTimeout {
        /// Transaction hash
        hash: String,
        /// Total polling budget
        elapsed: Duration,
    },
    /// Confirmation was abandoned by the caller
    #[error("confirmation of {hash} was cancelled")]
    Cancelled {
        /// Transaction hash
        hash: String,
    },
    /// Mined with a failing status
    #[error("Transaction {hash} has failed with status: {status}. Gas used: {gas_used}. Revert reason: '{reason}'.")]
    Reverted {
        /// Transaction hash
        hash: String,
        /// Raw status code
        status: i64,
        /// Gas used as reported
        gas_used: String,
        /// Decoded revert reason or `N/A`
        reason: String,
    },
    /// A read-only call reverted
    #[error("Contract Call has been reverted by the EVM with the reason: '{reason}'.")]
    CallReverted {
        /// Decoded revert reason or the node's error message
        reason: String,
    },
    /// A successful response lacked an expected field
    #[error("missing {0} in response")]
    MissingField(&'static str),
    /// Deployment receipt carried no contract address
    #[error("empty contract address returned for {hash}")]
    MissingContractAddress {
        /// Deployment transaction hash
        hash: String,
    },
    /// A single-value call returned nothing
    #[error("Empty value (0x) returned from contract")]
    EmptyCallResult,
    /// Client could not be built from its configuration
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// Private key could not be loaded
    #[error(transparent)]
    Key(#[from] KeyError),
    /// Signing failed
    #[error(transparent)]
    Signing(#[from] SigningError),
    /// Call data could not be encoded
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// Return data or logs could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Hex field in a response could not be parsed
    #[error(transparent)]
    Hex(#[from] HexError),
}
