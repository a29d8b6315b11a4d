//! Configuration

use std::{env, fmt, time::Duration};

use serde::{Deserialize, Serialize};

/// One block period.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;

/// Receipt requests before giving up.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 30;

/// HTTP request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// How the next nonce is obtained
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NonceStrategy {
    /// Ask the node before every transaction
    #[default]
    Network,
    /// Ask once, then count locally. Only safe with a single writer per
    /// account.
    Batch,
}

impl From<&str> for NonceStrategy {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "batch" => Self::Batch,
            _ => Self::Network,
        }
    }
}

/// Client configuration
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Node RPC URL
    pub rpc_url: String,
    /// Chain the client talks to
    pub chain_id: u64,
    /// Hex private key used for signing
    #[serde(default, skip_serializing)]
    pub private_key: Option<String>,
    /// Sleep between receipt requests, in milliseconds
    pub poll_interval_ms: u64,
    /// Receipt requests before giving up
    pub poll_attempts: u32,
    /// Nonce strategy
    pub nonce_strategy: NonceStrategy,
    /// HTTP request timeout, in seconds
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8089".to_string(),
            chain_id: 1,
            private_key: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            nonce_strategy: NonceStrategy::Network,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Load from environment variables. Missing or unparsable values fall
    /// back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            rpc_url: lookup("THK_RPC_URL").unwrap_or(defaults.rpc_url),
            chain_id: lookup("THK_CHAIN_ID")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.chain_id),
            private_key: lookup("THK_PRIVATE_KEY").filter(|s| !s.is_empty()),
            poll_interval_ms: lookup("THK_POLL_INTERVAL_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.poll_interval_ms),
            poll_attempts: lookup("THK_POLL_ATTEMPTS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.poll_attempts),
            nonce_strategy: lookup("THK_NONCE_STRATEGY")
                .map(|s| NonceStrategy::from(s.as_str()))
                .unwrap_or_default(),
            request_timeout_secs: lookup("THK_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    /// Sleep between receipt requests.
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// HTTP request timeout.
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("rpc_url", &self.rpc_url)
            .field("chain_id", &self.chain_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("poll_attempts", &self.poll_attempts)
            .field("nonce_strategy", &self.nonce_strategy)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
