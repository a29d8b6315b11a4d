//! Thinkium value transfer
//!
//! Sends `THK_TRANSFER_VALUE` (decimal, smallest unit) from the account of
//! `THK_PRIVATE_KEY` to `THK_TRANSFER_TO`, given either as a hex address or
//! as a direct IBAN, and waits for the receipt. Node and polling settings
//! come from the usual `THK_*` variables.

use anyhow::{anyhow, Context, Result};
use thk_client::{ClientConfig, RawTransactionManager, Transfer, U256};
use thk_primitives::{iban, numeric::u256_from_dec, Address};
use tracing::info;

fn parse_recipient(input: &str) -> Result<Address> {
    if input.starts_with(iban::COUNTRY_CODE) {
        return iban::to_address(input).map_err(|e| anyhow!("invalid IBAN {input}: {e}"));
    }
    input.parse().map_err(|e| anyhow!("invalid address {input}: {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ClientConfig::from_env();
    info!(?config, "loaded configuration");

    let to = parse_recipient(&std::env::var("THK_TRANSFER_TO").context("THK_TRANSFER_TO is not set")?)?;
    let value = match std::env::var("THK_TRANSFER_VALUE") {
        Ok(value) => u256_from_dec(&value).map_err(|e| anyhow!("invalid THK_TRANSFER_VALUE: {e}"))?,
        Err(_) => U256::from(1u64),
    };

    let manager = RawTransactionManager::from_config(&config)?;
    let from = *manager.address();
    let account = manager.thk().get_account(config.chain_id, &from).await?;
    info!(%from, iban = %iban::from_address(&from), balance = %account.balance, nonce = account.nonce, "sender");

    let receipt = Transfer::new(&manager).send(to, value).await?;
    info!(
        hash = %receipt.transaction_hash,
        block = receipt.block_height,
        gas_used = %receipt.gas_used,
        "transfer confirmed"
    );

    Ok(())
}
