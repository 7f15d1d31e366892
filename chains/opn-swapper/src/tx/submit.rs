use super::builder::{ContractCall, TxBuilder};
use crate::chain::ChainRpc;
use crate::config::SwapConfig;
use crate::utils::gas::{GasManager, GasParams, GasPriority, GasSource};
use anyhow::{Context, Result};
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const MIN_GAS_LIMIT: u64 = 21_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasLimitSource {
    Estimated,
    /// Estimation failed; the call's own limit was used.
    FallbackProvided,
    /// Estimation failed; the operation's configured limit was used.
    FallbackDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeSource {
    Quoted(GasSource),
    /// The quote was unaffordable, fees dropped to the network minimum.
    MinimumGasPrice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent {
        hash: H256,
        gas_limit: U256,
        gas_limit_source: GasLimitSource,
        fee_source: FeeSource,
    },
    InsufficientFunds {
        required: U256,
        balance: U256,
    },
    SendFailed {
        reason: String,
    },
}

impl SubmitOutcome {
    pub fn tx_hash(&self) -> Option<H256> {
        match self {
            SubmitOutcome::Sent { hash, .. } => Some(*hash),
            _ => None,
        }
    }

    /// Node rejected the fee pair; worth one retry at high priority.
    pub fn is_priority_fee_error(&self) -> bool {
        match self {
            SubmitOutcome::SendFailed { reason } => is_priority_fee_error(reason),
            _ => false,
        }
    }
}

pub fn is_priority_fee_error(reason: &str) -> bool {
    reason.to_lowercase().contains("max priority fee")
}

enum Affordability {
    Quoted,
    Minimum,
    Short { required: U256 },
}

/// Turns a [`ContractCall`] into exactly one signed, broadcast transaction.
pub struct Submitter {
    rpc: Arc<dyn ChainRpc>,
    wallet: LocalWallet,
    gas: GasManager,
    builder: TxBuilder,
    config: Arc<SwapConfig>,
}

impl Submitter {
    pub fn new(rpc: Arc<dyn ChainRpc>, wallet: LocalWallet, config: Arc<SwapConfig>) -> Self {
        let wallet = wallet.with_chain_id(config.chain_id);
        let builder = TxBuilder::new(wallet.address(), config.chain_id);
        Self {
            rpc,
            gas: GasManager::new(config.gas_config()),
            builder,
            wallet,
            config,
        }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn rpc(&self) -> &dyn ChainRpc {
        self.rpc.as_ref()
    }

    pub fn gas(&self) -> &GasManager {
        &self.gas
    }

    pub async fn prepare_and_send(&self, call: &ContractCall, priority: GasPriority) -> SubmitOutcome {
        match self.try_send(call, priority).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let reason = format!("{:#}", e);
                error!("Transaction error ({}): {}", call.encoding.label(), reason);
                SubmitOutcome::SendFailed { reason }
            }
        }
    }

    async fn try_send(&self, call: &ContractCall, priority: GasPriority) -> Result<SubmitOutcome> {
        let rpc = self.rpc();
        let quote = self.gas.gas_params(rpc, priority).await;
        let request = self.builder.build(rpc, call).await?;

        let (gas_limit, gas_limit_source) = self.gas_limit(&request, call).await;

        let balance = match rpc.balance(self.address()).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!("Could not read balance, assuming zero: {:#}", e);
                U256::zero()
            }
        };

        let (fees, fee_source) = match self.affordability(quote.params, gas_limit, call.value, balance) {
            Affordability::Quoted => (quote.params, FeeSource::Quoted(quote.source)),
            Affordability::Minimum => (self.gas.minimum_params(), FeeSource::MinimumGasPrice),
            Affordability::Short { required } => {
                error!(
                    "Insufficient funds: need {} OPN, have {} OPN",
                    ethers::utils::format_ether(required),
                    ethers::utils::format_ether(balance)
                );
                return Ok(SubmitOutcome::InsufficientFunds { required, balance });
            }
        };

        if fee_source == FeeSource::MinimumGasPrice {
            warn!("Balance too low for quoted fees, using minimum gas price");
        }

        let tx: TypedTransaction = request
            .gas(gas_limit)
            .max_fee_per_gas(fees.max_fee_per_gas)
            .max_priority_fee_per_gas(fees.max_priority_fee_per_gas)
            .into();

        let signature = self
            .wallet
            .sign_transaction(&tx)
            .await
            .context("Failed to sign transaction")?;
        let hash = rpc.send_signed(&tx, &signature).await?;

        info!("Transaction sent ({}): {:?}", call.encoding.label(), hash);
        info!("Explorer: {}", self.config.tx_url(hash));

        Ok(SubmitOutcome::Sent {
            hash,
            gas_limit,
            gas_limit_source,
            fee_source,
        })
    }

    async fn gas_limit(
        &self,
        request: &Eip1559TransactionRequest,
        call: &ContractCall,
    ) -> (U256, GasLimitSource) {
        let cap = self.gas.limit_for(call.op);
        let estimate_tx: TypedTransaction = request.clone().into();

        match self.rpc().estimate_gas(&estimate_tx).await {
            Ok(estimate) => {
                let padded = (estimate * U256::from(12u64) / U256::from(10u64))
                    .max(U256::from(MIN_GAS_LIMIT))
                    .min(cap);
                debug!("Gas estimate {} -> limit {}", estimate, padded);
                (padded, GasLimitSource::Estimated)
            }
            Err(e) => {
                warn!("Gas estimation failed, using fallback limit: {:#}", e);
                match call.gas_limit {
                    Some(limit) => (limit, GasLimitSource::FallbackProvided),
                    None => (cap, GasLimitSource::FallbackDefault),
                }
            }
        }
    }

    fn affordability(
        &self,
        quoted: GasParams,
        gas_limit: U256,
        value: U256,
        balance: U256,
    ) -> Affordability {
        let cost = |params: &GasParams| {
            gas_limit
                .saturating_mul(params.max_fee_per_gas)
                .saturating_add(value)
        };

        if balance >= cost(&quoted) {
            return Affordability::Quoted;
        }
        let required = cost(&self.gas.minimum_params());
        if balance >= required {
            Affordability::Minimum
        } else {
            Affordability::Short { required }
        }
    }
}
