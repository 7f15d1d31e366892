use super::{ChainRpc, HttpChain};
use crate::config::SwapConfig;
use async_trait::async_trait;
use core_logic::{with_retry, NetworkError, RetryConfig};
use ethers::prelude::*;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Opens a verified RPC session. One connection per wallet.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn ChainRpc>, NetworkError>;
}

#[derive(Debug, Clone)]
pub struct HttpConnector {
    rpc_url: String,
    chain_id: u64,
    retry: RetryConfig,
    request_timeout: Duration,
}

impl HttpConnector {
    pub fn new(rpc_url: impl Into<String>, chain_id: u64) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            chain_id,
            // 2s, 4s, 6s between the four attempts
            retry: RetryConfig::linear(3, 2000),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Endpoint, chain id and retry policy taken from the loaded config.
    pub fn from_config(config: &SwapConfig) -> Self {
        Self::new(config.rpc_url.clone(), config.chain_id).with_retry(config.connect_retry())
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn unreachable(&self, reason: impl ToString) -> NetworkError {
        NetworkError::Unreachable {
            endpoint: self.rpc_url.clone(),
            attempts: self.retry.max_retries + 1,
            reason: reason.to_string(),
        }
    }

    fn build_provider(&self) -> Result<Provider<Http>, NetworkError> {
        let url = reqwest::Url::parse(&self.rpc_url).map_err(|e| self.unreachable(e))?;
        let client = Client::builder()
            .timeout(self.request_timeout)
            .build()
            .map_err(|e| self.unreachable(e))?;
        Ok(Provider::new(Http::new_with_client(url, client)))
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self) -> Result<Arc<dyn ChainRpc>, NetworkError> {
        let chain = HttpChain::new(self.build_provider()?);

        let actual = with_retry(self.retry.clone(), "RPC connection", || chain.chain_id())
            .await
            .map_err(|e| self.unreachable(format!("{:#}", e)))?;

        if actual != self.chain_id {
            return Err(NetworkError::ChainIdMismatch {
                endpoint: self.rpc_url.clone(),
                expected: self.chain_id,
                actual,
            });
        }

        debug!("Connected to {} (chain {})", self.rpc_url, actual);
        Ok(Arc::new(chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_after_retries() {
        let connector = HttpConnector::new("http://127.0.0.1:1", 984)
            .with_retry(RetryConfig::linear(1, 10));

        match connector.connect().await {
            Err(NetworkError::Unreachable { attempts, endpoint, .. }) => {
                assert_eq!(attempts, 2);
                assert_eq!(endpoint, "http://127.0.0.1:1");
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("connection to a closed port succeeded"),
        }
    }

    #[tokio::test]
    async fn test_config_retry_count_is_used() {
        let config = SwapConfig {
            rpc_url: "http://127.0.0.1:1".to_string(),
            connect_retries: 0,
            connect_backoff_ms: 1,
            ..Default::default()
        };

        match HttpConnector::from_config(&config).connect().await {
            Err(NetworkError::Unreachable { attempts, .. }) => assert_eq!(attempts, 1),
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("connection to a closed port succeeded"),
        }
    }

    #[tokio::test]
    async fn test_bad_url_is_unreachable() {
        let connector = HttpConnector::new("not a url", 984);
        assert!(matches!(
            connector.connect().await,
            Err(NetworkError::Unreachable { .. })
        ));
    }
}
