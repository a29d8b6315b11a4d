//! Typed access to the node's RPC methods.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thk_primitives::Address;
use tracing::debug;

use crate::{
    error::{TransactionError, TransportError},
    protocol::{
        Account, CallResponse, ChainQuery, ReceiptPoll, Response, SendTxResult,
        METHOD_CALL_TRANSACTION, METHOD_GET_ACCOUNT, METHOD_GET_TRANSACTION_BY_HASH, METHOD_SEND_TX,
    },
    receipt::TransactionReceipt,
    transaction::{SignedTransaction, UnsignedTransaction},
    transport::Transport,
};

/// RPC client over a [`Transport`]
#[derive(Debug)]
pub struct Thk<T> {
    transport: T,
}

impl<T: Transport> Thk<T> {
    /// Wrap a transport.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: &str,
        params: impl Serialize + Send,
    ) -> Result<Response<R>, TransportError> {
        let params = serde_json::to_value(params)?;
        let raw = self.transport.send(method, params).await?;
        Ok(Response::from_value(raw)?)
    }

    /// Account state on `chain_id`.
    pub async fn get_account(
        &self,
        chain_id: u64,
        address: &Address,
    ) -> Result<Account, TransactionError> {
        let params =
            ChainQuery { chain_id: chain_id.to_string(), address: Some(address), hash: None };
        self.request::<Account>(METHOD_GET_ACCOUNT, params).await?.into_result("account")
    }

    /// Next nonce of `address` as known to the node.
    pub async fn get_nonce(&self, chain_id: u64, address: &Address) -> Result<u64, TransactionError> {
        let nonce = self.get_account(chain_id, address).await?.nonce;
        debug!(%address, nonce, "fetched nonce");
        Ok(nonce)
    }

    /// One receipt request. "Not found" is [`ReceiptPoll::Pending`]; every
    /// other failure is [`ReceiptPoll::Fatal`].
    pub async fn get_transaction_by_hash(&self, chain_id: u64, hash: &str) -> ReceiptPoll {
        let params = ChainQuery { chain_id: chain_id.to_string(), address: None, hash: Some(hash) };
        let response = match self
            .request::<TransactionReceipt>(METHOD_GET_TRANSACTION_BY_HASH, params)
            .await
        {
            Ok(response) => response,
            Err(err) => return ReceiptPoll::Fatal(err.into()),
        };

        let error = response.rpc_error().cloned();
        match (error, response.result) {
            (Some(error), _) if error.is_not_found() => ReceiptPoll::Pending,
            (Some(error), _) => {
                ReceiptPoll::Fatal(TransactionError::Chain { code: error.code, message: error.message })
            }
            (None, Some(receipt)) => ReceiptPoll::Ready(Box::new(receipt)),
            (None, None) => ReceiptPoll::Pending,
        }
    }

    /// Submit a signed transaction and return the hash reported by the node.
    pub async fn send_tx(&self, tx: &SignedTransaction) -> Result<String, TransactionError> {
        let result = self.request::<SendTxResult>(METHOD_SEND_TX, tx.params()).await?;
        Ok(result.into_result("TXhash")?.tx_hash)
    }

    /// Execute a read-only call. A node error is returned inside the
    /// response, not as `Err`, so the caller can extract a revert reason.
    pub async fn call_transaction(
        &self,
        tx: &UnsignedTransaction,
    ) -> Result<CallResponse, TransactionError> {
        let response = self.request::<Value>(METHOD_CALL_TRANSACTION, tx.params()).await?;
        let error = response.rpc_error().cloned();
        let out = match response.result {
            Some(Value::String(out)) => Some(out),
            Some(Value::Object(mut result)) => match result.remove("out") {
                Some(Value::String(out)) => Some(out),
                _ => None,
            },
            _ => None,
        };
        Ok(CallResponse { out, error })
    }
}
