//! Transaction records, their hash and the signed envelope.

use alloy_primitives::U256;
use serde::Serialize;
use thk_crypto::{Credentials, SigningError};
use thk_primitives::{keccak256, numeric::encode_hex, Address, Hash};

/// Lifecycle stage of a transaction, used to tag log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionStage {
    /// Unsigned record assembled
    Built,
    /// Hash computed and signed
    Signed,
    /// Accepted by the node
    Submitted,
    /// Waiting for a receipt
    Pending,
    /// Receipt with status ok
    Confirmed,
    /// Receipt with a failing status, or a fatal node error
    Failed,
    /// Attempt budget exhausted
    TimedOut,
}

impl TransactionStage {
    /// Returns the string representation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Built => "built",
            Self::Signed => "signed",
            Self::Submitted => "submitted",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        }
    }
}

/// `extra` payload carrying a gas limit: the hex of `{"gas": N}`.
pub fn gas_extra(gas_limit: u64) -> Vec<u8> {
    format!("{{\"gas\": {gas_limit}}}").into_bytes()
}

/// A transaction before signing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsignedTransaction {
    /// Chain that executes the transaction
    pub chain_id: u64,
    /// Source chain, equal to `chain_id` for local transactions
    pub from_chain_id: u64,
    /// Destination chain, equal to `chain_id` for local transactions
    pub to_chain_id: u64,
    /// Sender, filled in when signing
    pub from: Option<Address>,
    /// Recipient; `None` deploys a contract
    pub to: Option<Address>,
    /// Sender nonce
    pub nonce: u64,
    /// Transferred value
    pub value: U256,
    /// Call data or contract bytecode
    pub input: Vec<u8>,
    /// Execute against local state only
    pub use_local: bool,
    /// Opaque extension data
    pub extra: Vec<u8>,
}

impl UnsignedTransaction {
    /// A state-changing transaction limited to `gas_limit`.
    pub fn new(
        chain_id: u64,
        nonce: u64,
        gas_limit: u64,
        to: Option<Address>,
        value: U256,
        input: Vec<u8>,
    ) -> Self {
        Self {
            chain_id,
            from_chain_id: chain_id,
            to_chain_id: chain_id,
            from: None,
            to,
            nonce,
            value,
            input,
            use_local: false,
            extra: gas_extra(gas_limit),
        }
    }

    /// A read-only call: nonce and value zero, no extra data.
    pub fn call(chain_id: u64, from: Address, to: Address, input: Vec<u8>) -> Self {
        Self {
            chain_id,
            from_chain_id: chain_id,
            to_chain_id: chain_id,
            from: Some(from),
            to: Some(to),
            nonce: 0,
            value: U256::ZERO,
            input,
            use_local: false,
            extra: Vec::new(),
        }
    }

    /// `chainId-from-to-nonce-useLocal-value-input-extra` with every hex
    /// field unprefixed and absent fields empty.
    pub fn hash_preimage(&self) -> String {
        let address = |a: &Option<Address>| a.as_ref().map(Address::to_lower_hex).unwrap_or_default();
        format!(
            "{}-{}-{}-{}-{}-{}-{}-{}",
            self.chain_id,
            address(&self.from),
            address(&self.to),
            self.nonce,
            if self.use_local { "1" } else { "0" },
            self.value,
            encode_hex(&self.input),
            encode_hex(&self.extra),
        )
    }

    /// Keccak-256 of [`UnsignedTransaction::hash_preimage`].
    pub fn hash(&self) -> Hash {
        keccak256(self.hash_preimage().as_bytes())
    }

    /// Bind the sender to `credentials` and sign the resulting hash.
    pub fn sign(mut self, credentials: &Credentials) -> Result<SignedTransaction, SigningError> {
        self.from = Some(*credentials.address());
        let hash = self.hash();
        let signature = credentials.sign_hash(&hash)?;
        Ok(SignedTransaction {
            transaction: self,
            sig: signature.to_hex(),
            public_key: credentials.public_key_hex(),
            hash,
        })
    }

    /// Parameters for an unsigned request such as `CallTransaction`.
    pub fn params(&self) -> TransactionParams {
        TransactionParams::new(self, String::new(), String::new())
    }
}

/// A signed transaction ready for submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: UnsignedTransaction,
    sig: String,
    public_key: String,
    hash: Hash,
}

impl SignedTransaction {
    /// The signed record.
    pub const fn transaction(&self) -> &UnsignedTransaction {
        &self.transaction
    }

    /// `0x` + r ‖ s ‖ v.
    pub fn sig(&self) -> &str {
        &self.sig
    }

    /// `0x04` + uncompressed public key.
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// Locally computed hash.
    pub const fn hash(&self) -> &Hash {
        &self.hash
    }

    /// `0x` hex of the hash, the form the node reports.
    pub fn hash_hex(&self) -> String {
        format!("0x{}", encode_hex(self.hash))
    }

    /// Parameters for `SendTx`.
    pub fn params(&self) -> TransactionParams {
        TransactionParams::new(&self.transaction, self.sig.clone(), self.public_key.clone())
    }
}

/// Wire form of a transaction. Numbers travel as decimal strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
    chain_id: String,
    from_chain_id: String,
    to_chain_id: String,
    sig: String,
    #[serde(rename = "pub")]
    public_key: String,
    from: String,
    to: String,
    nonce: String,
    value: String,
    input: String,
    use_local: bool,
    extra: String,
}

impl TransactionParams {
    fn new(tx: &UnsignedTransaction, sig: String, public_key: String) -> Self {
        let address = |a: &Option<Address>| {
            a.as_ref().map(|a| format!("0x{}", a.to_lower_hex())).unwrap_or_default()
        };
        Self {
            chain_id: tx.chain_id.to_string(),
            from_chain_id: tx.from_chain_id.to_string(),
            to_chain_id: tx.to_chain_id.to_string(),
            sig,
            public_key,
            from: address(&tx.from),
            to: address(&tx.to),
            nonce: tx.nonce.to_string(),
            value: tx.value.to_string(),
            input: if tx.input.is_empty() {
                String::new()
            } else {
                format!("0x{}", encode_hex(&tx.input))
            },
            use_local: tx.use_local,
            extra: encode_hex(&tx.extra),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use thk_crypto::Signature;

    const FROM: &str = "0xf167a1c5c5fab6bddca66118216817af3fa86827";
    const TO: &str = "0x5dfcfc6f4b48f93213dad643a50228ff873c15b9";
    const KEY: &str = "0x8e5b44b6cee8fa05092b4b5a8843aa6b0ec37915a940c9b5938e88a7e6fdd83a";

    fn transfer() -> UnsignedTransaction {
        UnsignedTransaction {
            from: Some(FROM.parse().unwrap()),
            nonce: 7,
            value: U256::from(1_000_000_000_000_000_000u64),
            input: Vec::new(),
            extra: Vec::new(),
            ..UnsignedTransaction::new(1, 0, 0, Some(TO.parse().unwrap()), U256::ZERO, Vec::new())
        }
    }

    #[test]
    fn test_hash_preimage_and_hash() {
        let tx = transfer();
        assert_eq!(
            tx.hash_preimage(),
            "1-f167a1c5c5fab6bddca66118216817af3fa86827-5dfcfc6f4b48f93213dad643a50228ff873c15b9-7-0-1000000000000000000--"
        );
        assert_eq!(
            hex::encode(tx.hash()),
            "90e85cef8f7b78a38c7c7e3450df38936109fefa5149eda7859cd94b5d27ca58"
        );
    }

    #[test]
    fn test_hash_includes_input_and_extra() {
        let tx = UnsignedTransaction {
            from: Some(FROM.parse().unwrap()),
            ..UnsignedTransaction::new(
                1,
                0,
                21_000,
                Some(TO.parse().unwrap()),
                U256::from(5u64),
                vec![0xa9, 0x05, 0x9c, 0xbb],
            )
        };
        assert_eq!(hex::encode(&tx.extra), "7b22676173223a2032313030307d");
        assert_eq!(
            tx.hash_preimage(),
            "1-f167a1c5c5fab6bddca66118216817af3fa86827-5dfcfc6f4b48f93213dad643a50228ff873c15b9-0-0-5-a9059cbb-7b22676173223a2032313030307d"
        );
        assert_eq!(
            hex::encode(tx.hash()),
            "4a34054d42ccc0d82b1c24be9db001ba19a53ab8d428db932b02e5d0ab086654"
        );
    }

    #[test]
    fn test_deploy_has_empty_recipient() {
        let tx = UnsignedTransaction::new(2, 3, 100, None, U256::ZERO, vec![0x60]);
        assert!(tx.hash_preimage().starts_with("2---3-0-0-60-"));
    }

    #[test]
    fn test_sign_binds_sender_and_recovers() {
        let credentials = Credentials::from_private_key_hex(KEY).unwrap();
        let signed = transfer().sign(&credentials).unwrap();

        assert_eq!(signed.transaction().from.as_ref(), Some(credentials.address()));
        assert_eq!(*signed.hash(), signed.transaction().hash());

        let signature = Signature::from_hex(signed.sig()).unwrap();
        assert_eq!(signature.recover_address(signed.hash()).as_ref(), Some(credentials.address()));
        assert!(signed.public_key().starts_with("0x04"));
        assert_eq!(signed.public_key().len(), 132);
        assert_eq!(signed.hash_hex().len(), 66);
    }

    #[test]
    fn test_params_wire_shape() {
        let params = UnsignedTransaction::call(
            3,
            FROM.parse().unwrap(),
            TO.parse().unwrap(),
            vec![0x70, 0xa0, 0x82, 0x31],
        )
        .params();
        assert_eq!(
            serde_json::to_value(params).unwrap(),
            json!({
                "chainId": "3",
                "fromChainId": "3",
                "toChainId": "3",
                "sig": "",
                "pub": "",
                "from": FROM,
                "to": TO,
                "nonce": "0",
                "value": "0",
                "input": "0x70a08231",
                "useLocal": false,
                "extra": ""
            })
        );
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(TransactionStage::TimedOut.as_str(), "timed_out");
        assert_eq!(TransactionStage::Submitted.as_str(), "submitted");
    }
}
