//! In-memory transport with scripted responses.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use thk_crypto::Credentials;

use crate::{
    error::TransportError, manager::RawTransactionManager, processor::PollingReceiptProcessor,
    thk::Thk, transport::Transport,
};

#[derive(Debug, Default)]
struct Script {
    responses: VecDeque<Result<Value, String>>,
    fallback: Option<Value>,
    requests: Vec<(String, Value)>,
}

/// Replays queued responses in order and records every request. Clones share
/// the same script.
#[derive(Clone, Debug, Default)]
pub(crate) struct ScriptedTransport {
    script: Arc<Mutex<Script>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, response: Value) -> &Self {
        self.script.lock().unwrap().responses.push_back(Ok(response));
        self
    }

    pub(crate) fn push_result(&self, result: Value) -> &Self {
        self.push(json!({ "result": result }))
    }

    pub(crate) fn push_error(&self, code: i64, message: &str) -> &Self {
        self.push(json!({ "error": { "code": code, "message": message } }))
    }

    pub(crate) fn push_transport_failure(&self, message: &str) -> &Self {
        self.script.lock().unwrap().responses.push_back(Err(message.to_string()));
        self
    }

    /// Served once the queue is empty.
    pub(crate) fn fallback(&self, response: Value) -> &Self {
        self.script.lock().unwrap().fallback = Some(response);
        self
    }

    pub(crate) fn requests(&self) -> Vec<(String, Value)> {
        self.script.lock().unwrap().requests.clone()
    }

    pub(crate) fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|(m, _)| m == method).count()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let mut script = self.script.lock().unwrap();
        script.requests.push((method.to_string(), params));
        match script.responses.pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::Other(message)),
            None => script
                .fallback
                .clone()
                .ok_or_else(|| TransportError::Other(format!("no scripted response for {method}"))),
        }
    }
}

pub(crate) fn not_found() -> Value {
    json!({ "error": { "code": 4003, "message": "transaction not found" } })
}

pub(crate) fn receipt(hash: &str, status: i64) -> Value {
    json!({
        "result": {
            "status": status,
            "transactionHash": hash,
            "blockHeight": 10,
            "gasUsed": "21000",
            "gasFee": "0",
            "logs": [],
            "out": ""
        }
    })
}

pub(crate) const KEY: &str = "0x8e5b44b6cee8fa05092b4b5a8843aa6b0ec37915a940c9b5938e88a7e6fdd83a";

pub(crate) fn account(nonce: u64) -> Value {
    json!({
        "result": {
            "address": "0xf167a1c5c5fab6bddca66118216817af3fa86827",
            "nonce": nonce,
            "balance": "0"
        }
    })
}

pub(crate) fn sent(hash: &str) -> Value {
    json!({ "result": { "TXhash": hash } })
}

/// Manager signing with [`KEY`] on chain 1, polling every millisecond up to
/// five times.
pub(crate) fn manager(transport: &ScriptedTransport) -> RawTransactionManager<ScriptedTransport> {
    let thk = Arc::new(Thk::new(transport.clone()));
    let processor =
        Arc::new(PollingReceiptProcessor::new(Arc::clone(&thk), Duration::from_millis(1), 5));
    RawTransactionManager::new(thk, Credentials::from_private_key_hex(KEY).unwrap(), 1, processor)
}
