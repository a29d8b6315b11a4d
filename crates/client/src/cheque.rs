//! Cross-chain cheques.

use alloy_primitives::U256;
use thk_primitives::{numeric::encode_hex_prefixed, Address};

const fn system_contract(tag: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[17] = tag;
    Address::new(bytes)
}

/// Receives cheque-writing transactions on the source chain.
pub const WITHDRAW_CONTRACT: Address = system_contract(0x02);
/// Cashes a cheque on the destination chain.
pub const DEPOSIT_CONTRACT: Address = system_contract(0x03);
/// Cancels an expired cheque.
pub const CANCEL_CONTRACT: Address = system_contract(0x04);

/// A transfer of `amount` from one chain to another.
///
/// Once the destination chain passes `expire_height` the cheque can no
/// longer be cashed, only cancelled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CashCheque {
    /// Chain the cheque is written on
    pub from_chain_id: u32,
    /// Payer
    pub from_address: Address,
    /// Payer nonce on the source chain
    pub nonce: u64,
    /// Chain the cheque is cashed on
    pub to_chain_id: u32,
    /// Payee
    pub to_address: Address,
    /// Last destination height at which the cheque can be cashed
    pub expire_height: u64,
    /// Transferred amount
    pub amount: U256,
}

impl CashCheque {
    /// Transaction input for the withdraw contract, big-endian throughout:
    /// from chain (4) ‖ from address (20) ‖ nonce (8) ‖ to chain (4) ‖
    /// to address (20) ‖ expire height (8) ‖ `0x20` ‖ amount (32).
    pub fn to_input(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(97);
        bytes.extend_from_slice(&self.from_chain_id.to_be_bytes());
        bytes.extend_from_slice(self.from_address.as_bytes());
        bytes.extend_from_slice(&self.nonce.to_be_bytes());
        bytes.extend_from_slice(&self.to_chain_id.to_be_bytes());
        bytes.extend_from_slice(self.to_address.as_bytes());
        bytes.extend_from_slice(&self.expire_height.to_be_bytes());
        // length of the amount field
        bytes.push(0x20);
        bytes.extend_from_slice(&self.amount.to_be_bytes::<32>());
        bytes
    }

    /// `0x` hex of [`CashCheque::to_input`].
    pub fn encode(&self) -> String {
        encode_hex_prefixed(self.to_input())
    }
}
