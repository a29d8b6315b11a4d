//! Revert reason extraction.

use thk_abi::{decode, AbiType, REVERT_SELECTOR};
use thk_primitives::numeric::decode_hex;
use tracing::warn;

use crate::protocol::RpcError;

/// Reported when no reason can be recovered.
pub const MISSING_REASON: &str = "N/A";

/// Whether `out` is an `Error(string)` payload.
pub fn is_revert_payload(out: &str) -> bool {
    decode_hex(out).is_ok_and(|bytes| bytes.starts_with(&REVERT_SELECTOR))
}

/// Decode the message of an `Error(string)` payload.
pub fn decode_revert_payload(out: &str) -> Option<String> {
    let bytes = decode_hex(out).ok()?;
    let body = bytes.strip_prefix(&REVERT_SELECTOR[..])?;
    match decode(body, &[AbiType::String]) {
        Ok(mut values) => values.pop().and_then(|value| value.as_str().map(str::to_string)),
        Err(err) => {
            warn!("undecodable revert payload: {err}");
            None
        }
    }
}

/// Best-effort reason for a failed execution. Never fails: falls back to the
/// node's error message, then to [`MISSING_REASON`].
pub fn extract_revert_reason(out: Option<&str>, error: Option<&RpcError>) -> String {
    if let Some(reason) = out.and_then(decode_revert_payload) {
        return reason;
    }
    match error {
        Some(error) if !error.message.is_empty() => error.message.clone(),
        _ => MISSING_REASON.to_string(),
    }
}
