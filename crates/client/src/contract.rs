//! Calling, executing and deploying contracts.

use alloy_primitives::U256;
use thk_abi::{encode, AbiValue, Event, EventValues, Function};
use thk_primitives::Address;
use tracing::{debug, info};

use crate::{
    error::TransactionError,
    manager::{RawTransactionManager, TransactionRequest},
    receipt::TransactionReceipt,
    transport::Transport,
};

/// Gas limit used for contract transactions unless overridden.
pub const DEFAULT_GAS_LIMIT: u64 = 4_300_000;

/// A deployed contract bound to a transaction manager
#[derive(Debug)]
pub struct Contract<'a, T> {
    manager: &'a RawTransactionManager<T>,
    address: Address,
    gas_limit: u64,
}

impl<'a, T: Transport + 'static> Contract<'a, T> {
    /// Contract already deployed at `address`.
    pub const fn at(manager: &'a RawTransactionManager<T>, address: Address) -> Self {
        Self { manager, address, gas_limit: DEFAULT_GAS_LIMIT }
    }

    /// Override the gas limit of state-changing transactions.
    pub const fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Contract address.
    pub const fn address(&self) -> &Address {
        &self.address
    }

    /// Deploy `bytecode` with `constructor_args` appended and wait for the
    /// receipt, which must name the new contract.
    pub async fn deploy(
        manager: &'a RawTransactionManager<T>,
        bytecode: &[u8],
        constructor_args: &[AbiValue],
        value: U256,
    ) -> Result<(Self, TransactionReceipt), TransactionError> {
        let mut input = bytecode.to_vec();
        input.extend(encode(constructor_args)?);

        let request = TransactionRequest::deploy(input, DEFAULT_GAS_LIMIT).with_value(value);
        let receipt = manager.execute_transaction(request).await?;
        let address = receipt.contract_address().ok_or_else(|| {
            TransactionError::MissingContractAddress { hash: receipt.transaction_hash.clone() }
        })?;

        info!(%address, hash = %receipt.transaction_hash, "contract deployed");
        Ok((Self::at(manager, address), receipt))
    }

    /// Read-only call; returns the decoded outputs.
    pub async fn call(
        &self,
        function: &Function,
        args: &[AbiValue],
    ) -> Result<Vec<AbiValue>, TransactionError> {
        let data = function.encode_call(args)?;
        let out = self.manager.send_call(self.address, data).await?;
        debug!(function = %function.name, contract = %self.address, "call returned");
        Ok(function.decode_output_hex(&out)?)
    }

    /// Read-only call of a function with one output. An empty result is an
    /// error.
    pub async fn call_single(
        &self,
        function: &Function,
        args: &[AbiValue],
    ) -> Result<AbiValue, TransactionError> {
        self.call(function, args).await?.into_iter().next().ok_or(TransactionError::EmptyCallResult)
    }

    /// State-changing call; waits for a successful receipt.
    pub async fn execute(
        &self,
        function: &Function,
        args: &[AbiValue],
        value: U256,
    ) -> Result<TransactionReceipt, TransactionError> {
        let data = function.encode_call(args)?;
        let request = TransactionRequest::call(self.address, data, self.gas_limit).with_value(value);
        self.manager.execute_transaction(request).await
    }

    /// Decode every log of `receipt` that this contract emitted for `event`.
    pub fn extract_events(
        &self,
        event: &Event,
        receipt: &TransactionReceipt,
    ) -> Result<Vec<EventValues>, TransactionError> {
        let mut values = Vec::new();
        for log in &receipt.logs {
            if log.address.is_some_and(|address| address != self.address) {
                continue;
            }
            values.extend(log.decode(event)?);
        }
        Ok(values)
    }
}
