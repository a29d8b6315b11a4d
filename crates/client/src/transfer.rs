//! Plain value transfers.

use alloy_primitives::U256;
use thk_primitives::Address;
use tracing::info;

use crate::{
    error::TransactionError,
    manager::{RawTransactionManager, TransactionRequest, TRANSFER_GAS_LIMIT},
    receipt::TransactionReceipt,
    transport::Transport,
};

/// Sends value between accounts and waits for confirmation.
#[derive(Debug)]
pub struct Transfer<'a, T> {
    manager: &'a RawTransactionManager<T>,
}

impl<'a, T: Transport + 'static> Transfer<'a, T> {
    /// Transfers signed by `manager`.
    pub const fn new(manager: &'a RawTransactionManager<T>) -> Self {
        Self { manager }
    }

    /// Send `value` to `to` with the standard transfer gas limit.
    pub async fn send(&self, to: Address, value: U256) -> Result<TransactionReceipt, TransactionError> {
        self.send_with_gas_limit(to, value, TRANSFER_GAS_LIMIT).await
    }

    /// Send `value` to `to` with an explicit gas limit.
    pub async fn send_with_gas_limit(
        &self,
        to: Address,
        value: U256,
        gas_limit: u64,
    ) -> Result<TransactionReceipt, TransactionError> {
        info!(from = %self.manager.address(), %to, %value, "sending transfer");
        let request = TransactionRequest { gas_limit, ..TransactionRequest::transfer(to, value) };
        self.manager.execute_transaction(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        protocol::METHOD_SEND_TX,
        test_utils::{account, manager, receipt, sent, ScriptedTransport},
    };

    const HASH: &str = "0x90e85cef8f7b78a38c7c7e3450df38936109fefa5149eda7859cd94b5d27ca58";

    #[tokio::test]
    async fn test_transfer_uses_transfer_gas_limit() {
        let transport = ScriptedTransport::new();
        transport.push(account(7)).push(sent(HASH)).push(receipt(HASH, 1));
        let manager = manager(&transport);

        let to: Address = "0x5dfcfc6f4b48f93213dad643a50228ff873c15b9".parse().unwrap();
        let receipt = Transfer::new(&manager).send(to, U256::from(10u64).pow(U256::from(18u64))).await.unwrap();
        assert_eq!(receipt.transaction_hash, HASH);

        let requests = transport.requests();
        let (_, params) = requests.iter().find(|(method, _)| method == METHOD_SEND_TX).unwrap();
        assert_eq!(params["value"], "1000000000000000000");
        assert_eq!(params["input"], "");
        // {"gas": 21000}
        assert_eq!(params["extra"], "7b22676173223a2032313030307d");
    }
}
