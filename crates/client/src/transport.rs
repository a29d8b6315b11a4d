//! Delivery of method calls to a node.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::{config::ClientConfig, error::TransportError};

/// Method-based request/response channel to a node.
///
/// Implementations return the whole response envelope so the caller can
/// tell a result from an error.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `method` with `params` and return the response envelope.
    async fn send(&self, method: &str, params: Value) -> Result<Value, TransportError>;
}

/// JSON-RPC over HTTP POST
#[derive(Clone, Debug)]
pub struct HttpTransport {
    url: String,
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Transport with a default client.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), http_client: reqwest::Client::new() }
    }

    /// Transport for the configured node and request timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder().timeout(config.request_timeout()).build()?;
        Ok(Self { url: config.rpc_url.clone(), http_client })
    }

    /// Node URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        debug!(method, url = %self.url, "rpc request");

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        if !response.is_object() {
            return Err(TransportError::Other(format!("unexpected response to {method}: {response}")));
        }
        Ok(response)
    }
}
