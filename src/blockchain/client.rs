use crate::config::Config;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::CONTENT_TYPE;
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("RPC transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC request timed out after {0:?}")]
    Timeout(Duration),
}

/// Issues one JSON-RPC request and hands back the raw response body.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn fetch(&self, payload: &str, timeout: Duration) -> Result<Vec<u8>, ClientError>;
}

/// HTTP JSON-RPC client for an Ethereum-compatible node.
pub struct RpcClient {
    http: reqwest::Client,
    rpc_url: String,
    limiter: Option<DefaultDirectRateLimiter>,
}

impl RpcClient {
    pub fn new(config: &Config) -> Self {
        let limiter = config
            .rpc_rate_limit
            .and_then(NonZeroU32::new)
            .map(|per_second| RateLimiter::direct(Quota::per_second(per_second)));

        info!(
            "Initializing RPC client with endpoint: {}, rate limit: {:?}",
            config.rpc_url, config.rpc_rate_limit
        );

        Self {
            http: reqwest::Client::new(),
            rpc_url: config.rpc_url.clone(),
            limiter,
        }
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    async fn fetch(&self, payload: &str, timeout: Duration) -> Result<Vec<u8>, ClientError> {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }

        let response = self
            .http
            .post(&self.rpc_url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_owned())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        // JSON-RPC errors may ride on non-2xx statuses; the decoder decides.
        debug!("RPC responded with status {}", response.status());

        let body = response.bytes().await.map_err(|e| classify(e, timeout))?;
        Ok(body.to_vec())
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout(timeout)
    } else {
        ClientError::Http(err)
    }
}

/// Fetch with a hard deadline, whether or not the client honours `timeout` itself.
pub async fn fetch_with_deadline(
    client: &dyn ChainClient,
    payload: &str,
    timeout: Duration,
) -> Result<Vec<u8>, ClientError> {
    match tokio::time::timeout(timeout, client.fetch(payload, timeout)).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout(timeout)),
    }
}
