//! Nonce assignment, signing, submission and confirmation.

use std::{fmt, sync::Arc};

use alloy_primitives::U256;
use thk_crypto::Credentials;
use thk_primitives::Address;
use tokio::{runtime::Handle, sync::Mutex, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{
    config::{ClientConfig, NonceStrategy},
    error::TransactionError,
    processor::{PollingReceiptProcessor, TransactionReceiptProcessor},
    receipt::TransactionReceipt,
    thk::Thk,
    transaction::{SignedTransaction, TransactionStage, UnsignedTransaction},
    transport::{HttpTransport, Transport},
};

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// What to send; nonce, chain and sender are filled in by the manager.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Recipient; `None` deploys `input` as a contract
    pub to: Option<Address>,
    /// Transferred value
    pub value: U256,
    /// Call data or bytecode
    pub input: Vec<u8>,
    /// Gas limit carried in `extra`
    pub gas_limit: u64,
}

impl TransactionRequest {
    /// Plain value transfer.
    pub const fn transfer(to: Address, value: U256) -> Self {
        Self { to: Some(to), value, input: Vec::new(), gas_limit: TRANSFER_GAS_LIMIT }
    }

    /// Contract call carrying `input`.
    pub const fn call(to: Address, input: Vec<u8>, gas_limit: u64) -> Self {
        Self { to: Some(to), value: U256::ZERO, input, gas_limit }
    }

    /// Contract creation from `bytecode` with constructor arguments appended.
    pub const fn deploy(bytecode: Vec<u8>, gas_limit: u64) -> Self {
        Self { to: None, value: U256::ZERO, input: bytecode, gas_limit }
    }

    /// Attach a value.
    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

/// Signs locally and drives each transaction through submission and
/// confirmation.
///
/// Submissions from one manager are serialized so that a nonce is never
/// handed out twice. Two managers for the same account, or any other
/// sender, break that guarantee under [`NonceStrategy::Batch`].
pub struct RawTransactionManager<T> {
    thk: Arc<Thk<T>>,
    credentials: Arc<Credentials>,
    chain_id: u64,
    nonce_strategy: NonceStrategy,
    processor: Arc<dyn TransactionReceiptProcessor>,
    // guards submission; holds the next nonce under the batch strategy
    next_nonce: Mutex<Option<u64>>,
}

impl<T: Transport + 'static> RawTransactionManager<T> {
    /// Manager with the network nonce strategy.
    pub fn new(
        thk: Arc<Thk<T>>,
        credentials: Credentials,
        chain_id: u64,
        processor: Arc<dyn TransactionReceiptProcessor>,
    ) -> Self {
        Self {
            thk,
            credentials: Arc::new(credentials),
            chain_id,
            nonce_strategy: NonceStrategy::Network,
            processor,
            next_nonce: Mutex::new(None),
        }
    }

    /// Replace the receipt processor.
    pub fn with_processor(mut self, processor: Arc<dyn TransactionReceiptProcessor>) -> Self {
        self.processor = processor;
        self
    }

    /// Switch the nonce strategy. Clears any cached nonce.
    pub fn with_nonce_strategy(mut self, nonce_strategy: NonceStrategy) -> Self {
        self.nonce_strategy = nonce_strategy;
        self.next_nonce = Mutex::new(None);
        self
    }

    /// RPC client.
    pub fn thk(&self) -> &Arc<Thk<T>> {
        &self.thk
    }

    /// Signing credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Sender address.
    pub fn address(&self) -> &Address {
        self.credentials.address()
    }

    /// Chain transactions are sent to.
    pub const fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Active nonce strategy.
    pub const fn nonce_strategy(&self) -> NonceStrategy {
        self.nonce_strategy
    }

    async fn take_nonce(&self, cached: &mut Option<u64>) -> Result<u64, TransactionError> {
        match self.nonce_strategy {
            NonceStrategy::Network => self.thk.get_nonce(self.chain_id, self.address()).await,
            NonceStrategy::Batch => {
                let nonce = match *cached {
                    Some(nonce) => nonce,
                    None => self.thk.get_nonce(self.chain_id, self.address()).await?,
                };
                *cached = Some(nonce + 1);
                Ok(nonce)
            }
        }
    }

    /// Reserve the next nonce. Under the batch strategy the first call asks
    /// the node and later calls count up locally.
    pub async fn next_nonce(&self) -> Result<u64, TransactionError> {
        let mut cached = self.next_nonce.lock().await;
        self.take_nonce(&mut cached).await
    }

    /// Forget the cached nonce so the next transaction asks the node again.
    pub async fn reset_nonce(&self) {
        *self.next_nonce.lock().await = None;
    }

    /// Bind `tx` to this manager's credentials and sign it.
    pub fn sign(&self, tx: UnsignedTransaction) -> Result<SignedTransaction, TransactionError> {
        let signed = tx.sign(&self.credentials)?;
        debug!(hash = %signed.hash_hex(), stage = TransactionStage::Signed.as_str(), "transaction signed");
        Ok(signed)
    }

    /// Sign and submit `tx`, returning the hash reported by the node.
    ///
    /// A transport failure is reported as [`TransactionError::Submission`]
    /// with the locally computed hash: the node may still have accepted it.
    pub async fn sign_and_send(&self, tx: UnsignedTransaction) -> Result<String, TransactionError> {
        let signed = self.sign(tx)?;
        let local_hash = signed.hash_hex();
        match self.thk.send_tx(&signed).await {
            Ok(hash) => {
                if hash != local_hash {
                    debug!(%hash, %local_hash, "node reported a different hash");
                }
                info!(%hash, nonce = signed.transaction().nonce, stage = TransactionStage::Submitted.as_str(), "transaction submitted");
                Ok(hash)
            }
            Err(TransactionError::Transport(source)) => {
                warn!(%local_hash, "submission failed in transit: {source}");
                Err(TransactionError::Submission { local_hash, source })
            }
            Err(err) => {
                warn!(%local_hash, stage = TransactionStage::Failed.as_str(), "submission rejected: {err}");
                Err(err)
            }
        }
    }

    /// Assign a nonce, build, sign and submit without waiting for a receipt.
    pub async fn send_transaction(&self, request: TransactionRequest) -> Result<String, TransactionError> {
        let mut cached = self.next_nonce.lock().await;
        let nonce = self.take_nonce(&mut cached).await?;
        let tx = UnsignedTransaction::new(
            self.chain_id,
            nonce,
            request.gas_limit,
            request.to,
            request.value,
            request.input,
        );
        debug!(nonce, stage = TransactionStage::Built.as_str(), "transaction built");
        self.sign_and_send(tx).await
    }

    /// Send and wait for the receipt. A receipt with a failing status is
    /// [`TransactionError::Reverted`].
    pub async fn execute_transaction(
        &self,
        request: TransactionRequest,
    ) -> Result<TransactionReceipt, TransactionError> {
        let hash = self.send_transaction(request).await?;
        let receipt = self.processor.wait_for_receipt(self.chain_id, &hash).await?;

        let status = receipt.status();
        if !status.is_ok() {
            let reason = receipt.revert_reason();
            warn!(%hash, status = status.code(), %reason, stage = TransactionStage::Failed.as_str(), "transaction reverted");
            return Err(TransactionError::Reverted {
                hash,
                status: status.code(),
                gas_used: receipt.gas_used,
                reason,
            });
        }

        info!(%hash, block = receipt.block_height, stage = TransactionStage::Confirmed.as_str(), "transaction confirmed");
        Ok(receipt)
    }

    /// Read-only call to `to`. Returns the raw output as hex.
    pub async fn send_call(&self, to: Address, input: Vec<u8>) -> Result<String, TransactionError> {
        let tx = UnsignedTransaction::call(self.chain_id, *self.address(), to, input);
        let response = self.thk.call_transaction(&tx).await?;
        if response.is_reverted() {
            let reason = response.revert_reason();
            debug!(%to, %reason, "call reverted");
            return Err(TransactionError::CallReverted { reason });
        }
        Ok(response.out.unwrap_or_default())
    }

    /// Run [`RawTransactionManager::execute_transaction`] as a task on
    /// `handle`.
    pub fn spawn_execute(
        self: &Arc<Self>,
        handle: &Handle,
        request: TransactionRequest,
    ) -> JoinHandle<Result<TransactionReceipt, TransactionError>> {
        let manager = Arc::clone(self);
        handle.spawn(async move { manager.execute_transaction(request).await })
    }
}

impl RawTransactionManager<HttpTransport> {
    /// HTTP manager with a polling processor, all settings from `config`.
    /// Fails when no private key is configured.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransactionError> {
        let key = config
            .private_key
            .as_deref()
            .ok_or_else(|| TransactionError::Configuration("private key is not set".to_string()))?;
        let credentials = Credentials::from_private_key_hex(key)?;
        let thk = Arc::new(Thk::new(HttpTransport::from_config(config)?));
        let processor = Arc::new(PollingReceiptProcessor::from_config(Arc::clone(&thk), config));
        Ok(Self::new(thk, credentials, config.chain_id, processor)
            .with_nonce_strategy(config.nonce_strategy))
    }
}

impl<T> fmt::Debug for RawTransactionManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawTransactionManager")
            .field("address", self.credentials.address())
            .field("chain_id", &self.chain_id)
            .field("nonce_strategy", &self.nonce_strategy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        processor::NoOpReceiptProcessor,
        protocol::{METHOD_CALL_TRANSACTION, METHOD_GET_ACCOUNT, METHOD_SEND_TX},
        test_utils::{account, manager, not_found, receipt, sent, ScriptedTransport, KEY},
    };
    use serde_json::json;

    const TO: &str = "0x5dfcfc6f4b48f93213dad643a50228ff873c15b9";
    const HASH: &str = "0x4a34054d42ccc0d82b1c24be9db001ba19a53ab8d428db932b02e5d0ab086654";

    fn to() -> Address {
        TO.parse().unwrap()
    }

    #[tokio::test]
    async fn test_execute_transfer_confirms() {
        let transport = ScriptedTransport::new();
        transport.push(account(7)).push(sent(HASH)).push(not_found()).push(receipt(HASH, 1));

        let receipt = manager(&transport)
            .execute_transaction(TransactionRequest::transfer(to(), U256::from(1u64)))
            .await
            .unwrap();
        assert_eq!(receipt.transaction_hash, HASH);

        let requests = transport.requests();
        assert_eq!(requests[0].0, METHOD_GET_ACCOUNT);
        assert_eq!(requests[0].1["chainId"], "1");
        let (method, params) = &requests[1];
        assert_eq!(method, METHOD_SEND_TX);
        assert_eq!(params["nonce"], "7");
        assert_eq!(params["value"], "1");
        assert_eq!(params["to"], TO);
        assert_eq!(params["from"], "0xf167a1c5c5fab6bddca66118216817af3fa86827");
        assert_eq!(params["extra"], "7b22676173223a2032313030307d");
        assert_eq!(params["input"], "");
        assert!(params["sig"].as_str().unwrap().starts_with("0x"));
        assert!(params["pub"].as_str().unwrap().starts_with("0x04"));
    }

    #[tokio::test]
    async fn test_failed_receipt_is_reverted() {
        let transport = ScriptedTransport::new();
        let mut failed = receipt(HASH, 0);
        failed["result"]["out"] = json!(
            "0x08c379a0\
             0000000000000000000000000000000000000000000000000000000000000020\
             0000000000000000000000000000000000000000000000000000000000000012\
             496e73756666696369656e742066756e64730000000000000000000000000000"
        );
        transport.push(account(0)).push(sent(HASH)).push(failed);

        let err = manager(&transport)
            .execute_transaction(TransactionRequest::transfer(to(), U256::from(1u64)))
            .await
            .unwrap_err();
        match &err {
            TransactionError::Reverted { hash, status, gas_used, reason } => {
                assert_eq!(hash, HASH);
                assert_eq!(*status, 0);
                assert_eq!(gas_used, "21000");
                assert_eq!(reason, "Insufficient funds");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(err.to_string().contains("Revert reason: 'Insufficient funds'"));
    }

    #[tokio::test]
    async fn test_failed_receipt_without_reason() {
        let transport = ScriptedTransport::new();
        transport.push(account(0)).push(sent(HASH)).push(receipt(HASH, 0));

        let err = manager(&transport)
            .execute_transaction(TransactionRequest::transfer(to(), U256::ZERO))
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::Reverted { ref reason, .. } if reason == "N/A"));
    }

    #[tokio::test]
    async fn test_submission_failure_carries_local_hash() {
        let transport = ScriptedTransport::new();
        transport.push(account(0)).push_transport_failure("connection reset");

        let manager = manager(&transport);
        let err = manager
            .send_transaction(TransactionRequest::transfer(to(), U256::from(5u64)))
            .await
            .unwrap_err();

        let mut tx = UnsignedTransaction::new(1, 0, TRANSFER_GAS_LIMIT, Some(to()), U256::from(5u64), Vec::new());
        tx.from = Some(*manager.address());
        let expected = format!("0x{}", hex::encode(tx.hash()));
        match err {
            TransactionError::Submission { local_hash, .. } => assert_eq!(local_hash, expected),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_submission_is_chain_error() {
        let transport = ScriptedTransport::new();
        transport.push(account(0)).push_error(2001, "nonce too low");

        let err = manager(&transport)
            .send_transaction(TransactionRequest::transfer(to(), U256::ZERO))
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionError::Chain { code: 2001, .. }));
    }

    #[tokio::test]
    async fn test_batch_nonce_counts_locally() {
        let transport = ScriptedTransport::new();
        transport.push(account(4)).push(sent(HASH)).push(sent(HASH)).push(sent(HASH));

        let manager = manager(&transport).with_nonce_strategy(NonceStrategy::Batch);
        for _ in 0..3 {
            manager.send_transaction(TransactionRequest::transfer(to(), U256::ZERO)).await.unwrap();
        }

        assert_eq!(transport.count(METHOD_GET_ACCOUNT), 1);
        let nonces: Vec<_> = transport
            .requests()
            .into_iter()
            .filter(|(method, _)| method == METHOD_SEND_TX)
            .map(|(_, params)| params["nonce"].clone())
            .collect();
        assert_eq!(nonces, vec![json!("4"), json!("5"), json!("6")]);

        transport.push(account(20));
        manager.reset_nonce().await;
        assert_eq!(manager.next_nonce().await.unwrap(), 20);
        assert_eq!(manager.next_nonce().await.unwrap(), 21);
    }

    #[tokio::test]
    async fn test_network_nonce_asks_every_time() {
        let transport = ScriptedTransport::new();
        transport.push(account(3)).push(account(3));

        let manager = manager(&transport);
        assert_eq!(manager.next_nonce().await.unwrap(), 3);
        assert_eq!(manager.next_nonce().await.unwrap(), 3);
        assert_eq!(transport.count(METHOD_GET_ACCOUNT), 2);
    }

    #[tokio::test]
    async fn test_send_call_returns_output() {
        let transport = ScriptedTransport::new();
        transport.push_result(json!({"out": "0x0000000000000000000000000000000000000000000000000000000000000005"}));

        let out = manager(&transport).send_call(to(), vec![0x70, 0xa0, 0x82, 0x31]).await.unwrap();
        assert!(out.ends_with('5'));

        let (method, params) = &transport.requests()[0];
        assert_eq!(method, METHOD_CALL_TRANSACTION);
        assert_eq!(params["nonce"], "0");
        assert_eq!(params["sig"], "");
        assert_eq!(params["extra"], "");
        assert_eq!(params["useLocal"], false);
    }

    #[tokio::test]
    async fn test_send_call_reverted() {
        let transport = ScriptedTransport::new();
        transport.push(json!({"error": {"code": 3, "message": "execution reverted"}}));

        let err = manager(&transport).send_call(to(), Vec::new()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Contract Call has been reverted by the EVM with the reason: 'execution reverted'."
        );
    }

    #[tokio::test]
    async fn test_spawn_execute_with_noop_processor() {
        let transport = ScriptedTransport::new();
        transport.push(account(1)).push(sent(HASH));

        let manager = Arc::new(manager(&transport).with_processor(Arc::new(NoOpReceiptProcessor)));
        let handle = Handle::current();
        let receipt = manager
            .spawn_execute(&handle, TransactionRequest::transfer(to(), U256::ZERO))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(receipt.transaction_hash, HASH);
    }

    #[test]
    fn test_from_config_requires_key() {
        let err = RawTransactionManager::from_config(&ClientConfig::default()).unwrap_err();
        assert!(matches!(err, TransactionError::Configuration(_)));

        let config = ClientConfig {
            private_key: Some(KEY.to_string()),
            nonce_strategy: NonceStrategy::Batch,
            chain_id: 7,
            ..Default::default()
        };
        let manager = RawTransactionManager::from_config(&config).unwrap();
        assert_eq!(manager.chain_id(), 7);
        assert_eq!(manager.nonce_strategy(), NonceStrategy::Batch);
    }
}
