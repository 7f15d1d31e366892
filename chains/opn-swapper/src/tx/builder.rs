use super::encoding::CallEncoding;
use crate::chain::ChainRpc;
use crate::utils::gas::GasOp;
use anyhow::{Context, Result};
use ethers::prelude::*;

/// What to call, independent of gas and nonce.
#[derive(Debug, Clone)]
pub struct ContractCall {
    pub to: Address,
    pub value: U256,
    pub encoding: CallEncoding,
    pub op: GasOp,
    /// Used when gas estimation fails, ahead of the operation's default.
    pub gas_limit: Option<U256>,
}

impl ContractCall {
    pub fn new(to: Address, encoding: CallEncoding, op: GasOp) -> Self {
        Self {
            to,
            value: U256::zero(),
            encoding,
            op,
            gas_limit: None,
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: U256) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TxBuilder {
    from: Address,
    chain_id: u64,
}

impl TxBuilder {
    pub fn new(from: Address, chain_id: u64) -> Self {
        Self { from, chain_id }
    }

    pub fn from(&self) -> Address {
        self.from
    }

    /// Request without gas or fee fields. The nonce is fetched on every
    /// build, so a retried call never reuses a stale one.
    pub async fn build(
        &self,
        rpc: &dyn ChainRpc,
        call: &ContractCall,
    ) -> Result<Eip1559TransactionRequest> {
        let nonce = rpc
            .nonce(self.from)
            .await
            .with_context(|| format!("Failed to fetch nonce for {:?}", self.from))?;

        Ok(Eip1559TransactionRequest::new()
            .from(self.from)
            .to(call.to)
            .value(call.value)
            .data(call.encoding.calldata())
            .nonce(nonce)
            .chain_id(self.chain_id))
    }
}
