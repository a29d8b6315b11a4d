//! Transaction receipts and logs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thk_abi::{Event, EventValues};
use thk_primitives::{numeric::decode_hex, Address, Hash, HexError};

use crate::{
    error::TransactionError,
    protocol::{string_lenient, u64_lenient, vec_or_null},
};

/// Outcome recorded in a receipt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptStatus {
    /// Executed successfully
    Ok,
    /// Executed and reverted, or otherwise failed
    Failed(i64),
}

impl From<i64> for ReceiptStatus {
    fn from(code: i64) -> Self {
        if code == 1 {
            Self::Ok
        } else {
            Self::Failed(code)
        }
    }
}

impl ReceiptStatus {
    /// Raw status code.
    pub const fn code(self) -> i64 {
        match self {
            Self::Ok => 1,
            Self::Failed(code) => code,
        }
    }

    /// Status 1.
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

/// One log entry emitted during execution
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    /// Emitting contract
    #[serde(default)]
    pub address: Option<Address>,
    /// Topics as hex strings
    #[serde(default, deserialize_with = "vec_or_null")]
    pub topics: Vec<String>,
    /// Non-indexed data as hex
    #[serde(default, deserialize_with = "string_lenient")]
    pub data: String,
    /// Block the log was included in
    #[serde(default, deserialize_with = "u64_lenient")]
    pub block_number: u64,
    /// Transaction that emitted the log
    #[serde(default, deserialize_with = "string_lenient")]
    pub transaction_hash: String,
    /// Position within the transaction
    #[serde(default, deserialize_with = "u64_lenient")]
    pub index: u64,
}

impl Log {
    /// Topics as fixed 32-byte hashes.
    pub fn topic_hashes(&self) -> Result<Vec<Hash>, HexError> {
        self.topics
            .iter()
            .map(|topic| {
                let bytes = decode_hex(topic)?;
                let needed = bytes.len();
                <Hash>::try_from(bytes.as_slice())
                    .map_err(|_| HexError::ValueTooLarge { needed, available: 32 })
            })
            .collect()
    }

    /// Data as raw bytes.
    pub fn data_bytes(&self) -> Result<Vec<u8>, HexError> {
        decode_hex(&self.data)
    }

    /// Decode against `event`; `None` when the log belongs to another event.
    pub fn decode(&self, event: &Event) -> Result<Option<EventValues>, TransactionError> {
        Ok(event.decode_log(&self.topic_hashes()?, &self.data_bytes()?)?)
    }
}

/// Receipt of a mined transaction
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Transaction as echoed by the node
    #[serde(default)]
    pub tx: Value,
    /// Logs in emission order
    #[serde(default, deserialize_with = "vec_or_null")]
    pub logs: Vec<Log>,
    /// 1 on success
    #[serde(default)]
    pub status: i64,
    /// Transaction hash
    #[serde(default, deserialize_with = "string_lenient")]
    pub transaction_hash: String,
    /// Height of the including block
    #[serde(default, deserialize_with = "u64_lenient")]
    pub block_height: u64,
    /// Gas consumed
    #[serde(default, deserialize_with = "string_lenient")]
    pub gas_used: String,
    /// Fee charged
    #[serde(default, deserialize_with = "string_lenient")]
    pub gas_fee: String,
    /// Created contract, for deployments
    #[serde(default, deserialize_with = "string_lenient")]
    pub contract_address: String,
    /// State root after execution
    #[serde(default, deserialize_with = "string_lenient")]
    pub root: String,
    /// Return data, or the revert payload on failure
    #[serde(default, deserialize_with = "string_lenient")]
    pub out: String,
}

impl TransactionReceipt {
    /// Receipt carrying nothing but a hash.
    pub fn empty(hash: impl Into<String>) -> Self {
        Self { transaction_hash: hash.into(), status: 1, ..Default::default() }
    }

    /// Execution outcome.
    pub fn status(&self) -> ReceiptStatus {
        ReceiptStatus::from(self.status)
    }

    /// Created contract address, if any and non-zero.
    pub fn contract_address(&self) -> Option<Address> {
        if self.contract_address.is_empty() {
            return None;
        }
        self.contract_address.parse().ok().filter(|address| *address != Address::ZERO)
    }

    /// Revert reason decoded from `out`, or `N/A`.
    pub fn revert_reason(&self) -> String {
        let out = (!self.out.is_empty()).then_some(self.out.as_str());
        crate::revert::extract_revert_reason(out, None)
    }

    /// Decode every log matching `event`.
    pub fn events(&self, event: &Event) -> Result<Vec<EventValues>, TransactionError> {
        let mut values = Vec::new();
        for log in &self.logs {
            values.extend(log.decode(event)?);
        }
        Ok(values)
    }
}
