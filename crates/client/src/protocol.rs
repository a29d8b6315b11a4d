//! Request and response shapes of the node's RPC interface.

use alloy_primitives::U256;
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thk_primitives::{
    numeric::{has_hex_prefix, u256_from_dec, u256_from_hex},
    Address,
};

use crate::{error::TransactionError, receipt::TransactionReceipt};

/// `GetAccount {chainId, address}`
pub const METHOD_GET_ACCOUNT: &str = "GetAccount";
/// `GetTransactionByHash {chainId, hash}`
pub const METHOD_GET_TRANSACTION_BY_HASH: &str = "GetTransactionByHash";
/// `SendTx {transaction fields}`
pub const METHOD_SEND_TX: &str = "SendTx";
/// `CallTransaction {transaction fields}`
pub const METHOD_CALL_TRANSACTION: &str = "CallTransaction";

/// Error code meaning the transaction is not (yet) known to the node.
pub const TRANSACTION_NOT_FOUND: i64 = 4003;

/// Error envelope
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// 0 means no error
    #[serde(default)]
    pub code: i64,
    /// Human readable message
    #[serde(default)]
    pub message: String,
}

impl RpcError {
    /// Transaction not found, i.e. not mined yet.
    pub const fn is_not_found(&self) -> bool {
        self.code == TRANSACTION_NOT_FOUND
    }
}

/// Response envelope
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Response<T> {
    /// Payload, absent on error
    #[serde(default)]
    pub result: Option<T>,
    /// Error, if any
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl<T: DeserializeOwned> Response<T> {
    /// Parse a raw response value.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// The error, unless it is absent or carries code 0.
    pub fn rpc_error(&self) -> Option<&RpcError> {
        self.error.as_ref().filter(|e| e.code != 0)
    }

    /// Payload, or the node error as [`TransactionError::Chain`].
    pub fn into_result(self, field: &'static str) -> Result<T, TransactionError> {
        if let Some(error) = self.rpc_error() {
            return Err(TransactionError::Chain { code: error.code, message: error.message.clone() });
        }
        self.result.ok_or(TransactionError::MissingField(field))
    }
}

/// `GetAccount` / `GetTransactionByHash` parameters
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChainQuery<'a> {
    pub(crate) chain_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) address: Option<&'a Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) hash: Option<&'a str>,
}

/// Account state
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account address
    pub address: Option<Address>,
    /// Next nonce
    #[serde(default, deserialize_with = "u64_lenient")]
    pub nonce: u64,
    /// Balance in the smallest unit
    #[serde(default, deserialize_with = "u256_lenient")]
    pub balance: U256,
    /// Contract code hash
    #[serde(default)]
    pub code_hash: Option<String>,
    /// Storage root
    #[serde(default)]
    pub storage_root: Option<String>,
}

/// `SendTx` result
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct SendTxResult {
    #[serde(rename = "TXhash")]
    pub(crate) tx_hash: String,
}

/// `CallTransaction` response
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallResponse {
    /// Raw return data as hex
    pub out: Option<String>,
    /// Error envelope, if any
    pub error: Option<RpcError>,
}

impl CallResponse {
    /// Non-zero error, if any.
    pub fn rpc_error(&self) -> Option<&RpcError> {
        self.error.as_ref().filter(|e| e.code != 0)
    }

    /// Reverted either through the error envelope or an `Error(string)`
    /// payload in `out`.
    pub fn is_reverted(&self) -> bool {
        self.rpc_error().is_some()
            || self.out.as_deref().is_some_and(crate::revert::is_revert_payload)
    }

    /// Best-effort revert reason.
    pub fn revert_reason(&self) -> String {
        crate::revert::extract_revert_reason(self.out.as_deref(), self.rpc_error())
    }
}

/// Outcome of a single receipt request
#[derive(Debug)]
pub enum ReceiptPoll {
    /// Not mined yet
    Pending,
    /// Receipt available
    Ready(Box<TransactionReceipt>),
    /// Stop polling
    Fatal(TransactionError),
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a JSON number or a decimal / `0x` string.
pub(crate) fn u64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    use serde::de::Error;
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n.as_u64().ok_or_else(|| D::Error::custom(format!("invalid u64 {n}"))),
        Some(Value::String(s)) if has_hex_prefix(&s) => {
            u64::from_str_radix(&s[2..], 16).map_err(D::Error::custom)
        }
        Some(Value::String(s)) if s.is_empty() => Ok(0),
        Some(Value::String(s)) => s.parse().map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("invalid u64 {other}"))),
    }
}

/// Accepts a JSON number or a decimal / `0x` string.
pub(crate) fn u256_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    use serde::de::Error;
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(U256::ZERO),
        // numbers keep their source digits, fractions and exponents are rejected
        Some(Value::Number(n)) => {
            u256_from_dec(&n.to_string()).map_err(|_| D::Error::custom(format!("invalid amount {n}")))
        }
        Some(Value::String(s)) if has_hex_prefix(&s) => u256_from_hex(&s).map_err(D::Error::custom),
        Some(Value::String(s)) if s.is_empty() => Ok(U256::ZERO),
        Some(Value::String(s)) => u256_from_dec(&s).map_err(D::Error::custom),
        Some(other) => Err(D::Error::custom(format!("invalid amount {other}"))),
    }
}

/// Renders a JSON number or string as a string.
pub(crate) fn string_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

pub(crate) fn vec_or_null<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    null_as_default(deserializer)
}
