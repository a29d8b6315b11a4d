//! Waiting for receipts.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use tokio::{
    sync::watch,
    time::{sleep, sleep_until, Instant},
};
use tracing::{debug, info, warn};

use crate::{
    config::ClientConfig,
    error::TransactionError,
    protocol::ReceiptPoll,
    receipt::TransactionReceipt,
    thk::Thk,
    transaction::TransactionStage,
    transport::Transport,
};

/// Turns a submitted transaction hash into a receipt.
#[async_trait]
pub trait TransactionReceiptProcessor: Send + Sync {
    /// Wait for the receipt of `hash` on `chain_id`.
    async fn wait_for_receipt(
        &self,
        chain_id: u64,
        hash: &str,
    ) -> Result<TransactionReceipt, TransactionError>;
}

/// Requests the receipt at a fixed interval until it appears, a fatal error
/// is reported, the attempt budget runs out or the caller cancels.
#[derive(Debug)]
pub struct PollingReceiptProcessor<T> {
    thk: Arc<Thk<T>>,
    interval: Duration,
    attempts: u32,
    cancel: Option<watch::Receiver<bool>>,
}

impl<T: Transport> PollingReceiptProcessor<T> {
    /// Poll every `interval`, sending at most `attempts` requests.
    pub const fn new(thk: Arc<Thk<T>>, interval: Duration, attempts: u32) -> Self {
        Self { thk, interval, attempts, cancel: None }
    }

    /// Interval and budget from `config`.
    pub fn from_config(thk: Arc<Thk<T>>, config: &ClientConfig) -> Self {
        Self::new(thk, config.poll_interval(), config.poll_attempts)
    }

    /// Abandon waiting once `cancel` holds `true`.
    pub fn with_cancellation(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Sleep one interval; returns early with `Cancelled` if signalled.
    async fn pause(&self, hash: &str) -> Result<(), TransactionError> {
        let Some(rx) = &self.cancel else {
            sleep(self.interval).await;
            return Ok(());
        };
        let mut rx = rx.clone();
        let deadline = Instant::now() + self.interval;
        loop {
            tokio::select! {
                () = sleep_until(deadline) => return Ok(()),
                changed = rx.changed() => {
                    if changed.is_err() {
                        // sender gone, nobody can cancel any more
                        sleep_until(deadline).await;
                        return Ok(());
                    }
                    if *rx.borrow() {
                        return Err(TransactionError::Cancelled { hash: hash.to_string() });
                    }
                }
            }
        }
    }
}

#[async_trait]
impl<T: Transport> TransactionReceiptProcessor for PollingReceiptProcessor<T> {
    async fn wait_for_receipt(
        &self,
        chain_id: u64,
        hash: &str,
    ) -> Result<TransactionReceipt, TransactionError> {
        for attempt in 1..=self.attempts {
            if self.is_cancelled() {
                warn!(hash, attempt, "confirmation cancelled");
                return Err(TransactionError::Cancelled { hash: hash.to_string() });
            }

            match self.thk.get_transaction_by_hash(chain_id, hash).await {
                ReceiptPoll::Ready(receipt) => {
                    debug!(hash, attempt, "receipt received");
                    return Ok(*receipt);
                }
                ReceiptPoll::Fatal(err) => {
                    warn!(hash, attempt, stage = TransactionStage::Failed.as_str(), "receipt request failed: {err}");
                    return Err(err);
                }
                ReceiptPoll::Pending => {
                    debug!(hash, attempt, stage = TransactionStage::Pending.as_str(), "receipt not available yet");
                }
            }

            if attempt < self.attempts {
                self.pause(hash).await?;
            }
        }

        let elapsed = self.interval * self.attempts;
        info!(hash, stage = TransactionStage::TimedOut.as_str(), ?elapsed, "no receipt within budget");
        Err(TransactionError::ConfirmationTimeout { hash: hash.to_string(), elapsed })
    }
}

/// Returns at once with a receipt carrying only the hash. For
/// fire-and-forget submission.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpReceiptProcessor;

#[async_trait]
impl TransactionReceiptProcessor for NoOpReceiptProcessor {
    async fn wait_for_receipt(
        &self,
        _chain_id: u64,
        hash: &str,
    ) -> Result<TransactionReceipt, TransactionError> {
        Ok(TransactionReceipt::empty(hash))
    }
}
