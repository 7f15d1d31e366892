use crate::chain::ChainRpc;
use core_logic::GasConfig;
use ethers::prelude::*;
use tracing::{debug, warn};

/// Below this the node's price is treated as unusable and the configured
/// tier is used instead.
const LOW_PRICE_THRESHOLD_WEI: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasPriority {
    Normal,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasOp {
    Swap,
    Approve,
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasParams {
    pub max_fee_per_gas: U256,
    pub max_priority_fee_per_gas: U256,
}

/// Where a fee quote came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GasSource {
    Live,
    LowNetworkPrice,
    FallbackDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasQuote {
    pub params: GasParams,
    pub source: GasSource,
}

#[derive(Clone, Debug, Default)]
pub struct GasManager {
    config: GasConfig,
}

impl GasManager {
    pub fn new(config: GasConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GasConfig {
        &self.config
    }

    /// EIP-1559 fee fields for the given priority. Never fails: a node that
    /// cannot report its price yields the default tier.
    pub async fn gas_params(&self, rpc: &dyn ChainRpc, priority: GasPriority) -> GasQuote {
        match rpc.gas_price().await {
            Ok(live) => {
                let quote = self.params_for_price(live, priority);
                debug!(
                    "Gas quote ({:?}, {:?}): max_fee={} priority={}",
                    priority,
                    quote.source,
                    quote.params.max_fee_per_gas,
                    quote.params.max_priority_fee_per_gas
                );
                quote
            }
            Err(e) => {
                warn!("Could not read gas price, using defaults: {:#}", e);
                GasQuote {
                    params: self.fallback_params(),
                    source: GasSource::FallbackDefault,
                }
            }
        }
    }

    pub fn params_for_price(&self, live: U256, priority: GasPriority) -> GasQuote {
        let (max_fee, source) = if live < U256::from(LOW_PRICE_THRESHOLD_WEI) {
            let tier = match priority {
                GasPriority::Normal => self.config.default_wei(),
                GasPriority::High => self.config.high_wei(),
            };
            (U256::from(tier), GasSource::LowNetworkPrice)
        } else {
            let scaled = match priority {
                GasPriority::Normal => live * U256::from(3u64) / U256::from(2u64),
                GasPriority::High => live * U256::from(2u64),
            };
            (scaled, GasSource::Live)
        };

        let max_fee = max_fee.max(U256::from(self.config.min_wei()));
        let priority_fee = max_fee.min(U256::from(self.config.priority_cap_wei()));

        GasQuote {
            params: GasParams {
                max_fee_per_gas: max_fee,
                max_priority_fee_per_gas: priority_fee,
            },
            source,
        }
    }

    pub fn fallback_params(&self) -> GasParams {
        GasParams {
            max_fee_per_gas: U256::from(self.config.default_wei()),
            max_priority_fee_per_gas: U256::from(self.config.fallback_priority_wei()),
        }
    }

    /// Cheapest fees still accepted by the network, used when the balance
    /// cannot cover the quoted fees.
    pub fn minimum_params(&self) -> GasParams {
        GasParams {
            max_fee_per_gas: U256::from(self.config.min_wei()),
            max_priority_fee_per_gas: U256::from(self.config.fallback_priority_wei()),
        }
    }

    pub fn limit_for(&self, op: GasOp) -> U256 {
        let limit = match op {
            GasOp::Swap => self.config.limit_swap(),
            GasOp::Approve => self.config.limit_approve(),
            GasOp::Wrap => self.config.limit_wrap(),
        };
        U256::from(limit)
    }
}
