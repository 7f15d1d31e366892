//! JSON-RPC access behind a small trait so the submission pipeline can run
//! against a scripted chain in tests.

mod connector;

pub use connector::{Connector, HttpConnector};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;

/// The handful of RPC calls the swap pipeline needs.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn gas_price(&self) -> Result<U256>;

    async fn balance(&self, address: Address) -> Result<U256>;

    /// Next nonce, counting transactions still in the pool.
    async fn nonce(&self, address: Address) -> Result<U256>;

    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256>;

    async fn call(&self, tx: &TypedTransaction) -> Result<Bytes>;

    /// Broadcasts an already signed transaction.
    async fn send_signed(&self, tx: &TypedTransaction, signature: &Signature) -> Result<H256>;

    async fn receipt(&self, hash: H256) -> Result<Option<TransactionReceipt>>;
}

#[derive(Debug, Clone)]
pub struct HttpChain {
    provider: Provider<Http>,
}

impl HttpChain {
    pub fn new(provider: Provider<Http>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ChainRpc for HttpChain {
    async fn chain_id(&self) -> Result<u64> {
        let id = self
            .provider
            .get_chainid()
            .await
            .context("eth_chainId failed")?;
        Ok(id.as_u64())
    }

    async fn gas_price(&self) -> Result<U256> {
        self.provider
            .get_gas_price()
            .await
            .context("eth_gasPrice failed")
    }

    async fn balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address, None)
            .await
            .context("eth_getBalance failed")
    }

    async fn nonce(&self, address: Address) -> Result<U256> {
        self.provider
            .get_transaction_count(address, Some(BlockNumber::Pending.into()))
            .await
            .context("Failed to fetch nonce")
    }

    async fn estimate_gas(&self, tx: &TypedTransaction) -> Result<U256> {
        self.provider
            .estimate_gas(tx, None)
            .await
            .context("eth_estimateGas failed")
    }

    async fn call(&self, tx: &TypedTransaction) -> Result<Bytes> {
        self.provider.call(tx, None).await.context("eth_call failed")
    }

    async fn send_signed(&self, tx: &TypedTransaction, signature: &Signature) -> Result<H256> {
        let raw = tx.rlp_signed(signature);
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .context("eth_sendRawTransaction failed")?;
        Ok(pending.tx_hash())
    }

    async fn receipt(&self, hash: H256) -> Result<Option<TransactionReceipt>> {
        self.provider
            .get_transaction_receipt(hash)
            .await
            .context("eth_getTransactionReceipt failed")
    }
}
