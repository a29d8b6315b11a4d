//! Client for Thinkium chains.
//!
//! A transaction moves through [`TransactionStage`]s: it is built with a
//! nonce from the node (or a local counter, see [`NonceStrategy`]), signed
//! over its [`UnsignedTransaction::hash`], submitted with `SendTx`, then
//! confirmed by a [`TransactionReceiptProcessor`] that polls
//! `GetTransactionByHash` until a receipt appears.
//!
//! ```no_run
//! # async fn run() -> Result<(), thk_client::TransactionError> {
//! use thk_client::{ClientConfig, RawTransactionManager, Transfer, U256};
//!
//! let config = ClientConfig::from_env();
//! let manager = RawTransactionManager::from_config(&config)?;
//! let to = "0x5dfcfc6f4b48f93213dad643a50228ff873c15b9".parse().expect("valid address");
//! let receipt = Transfer::new(&manager).send(to, U256::from(1u64)).await?;
//! println!("mined in block {}", receipt.block_height);
//! # Ok(())
//! # }
//! ```

pub mod cheque;
pub mod config;
pub mod contract;
pub mod error;
pub mod manager;
pub mod processor;
pub mod protocol;
pub mod receipt;
pub mod revert;
pub mod thk;
pub mod transaction;
pub mod transfer;
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use alloy_primitives::U256;
pub use cheque::CashCheque;
pub use config::{ClientConfig, NonceStrategy};
pub use contract::Contract;
pub use error::{TransactionError, TransportError};
pub use manager::{RawTransactionManager, TransactionRequest};
pub use processor::{NoOpReceiptProcessor, PollingReceiptProcessor, TransactionReceiptProcessor};
pub use protocol::{Account, CallResponse, ReceiptPoll, RpcError};
pub use receipt::{Log, ReceiptStatus, TransactionReceipt};
pub use thk::Thk;
pub use transaction::{SignedTransaction, TransactionStage, UnsignedTransaction};
pub use transfer::Transfer;
pub use transport::{HttpTransport, Transport};
