use crate::pairs::TokenRef;
use anyhow::{Context, Result};
use config::{Config, File};
use core_logic::{ConfigError, GasConfig, GasConfigToml, RetryConfig};
use ethers::types::{Address, H256, U256};
use serde::Deserialize;
use std::time::Duration;

pub const ROUTER_ADDRESS: &str = "0xB489bce5c9c9364da2D1D1Bc5CE4274F63141885";
pub const WOPN_ADDRESS: &str = "0xBc022C9dEb5AF250A526321d16Ef52E39b4DBD84";
pub const OPNT_ADDRESS: &str = "0x2aEc1Db9197Ff284011A6A1d0752AD03F5782B0d";
pub const TUSDT_ADDRESS: &str = "0x3e01b4d892E0D0A219eF8BBe7e260a6bc8d9B31b";
pub const VINTAGE_ADDRESS: &str = "0x8E92E336Cf831a8159F8636c138561d5A7103595";

fn builtin(address: &str) -> Address {
    address.parse().expect("built-in contract address is valid")
}

/// Network, contract and timing settings. Built once at startup and shared
/// read-only (`Arc<SwapConfig>`) by every component.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SwapConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub explorer_url: String,

    pub router_address: Address,
    pub wopn_address: Address,
    pub opnt_address: Address,
    pub tusdt_address: Address,
    pub vintage_address: Address,

    pub private_key_file: String,
    /// Amount of the input asset per swap, in whole tokens (18 decimals).
    pub swap_amount: String,
    pub slippage_bps: u64,
    pub deadline_secs: u64,
    /// Native balance kept aside for gas on top of a native swap amount.
    pub native_gas_reserve: String,

    pub receipt_timeout_secs: u64,
    pub approval_timeout_secs: u64,
    pub receipt_poll_ms: u64,
    pub connect_retries: u32,
    pub connect_backoff_ms: u64,
    pub wallet_pause_ms: u64,
    pub cycle_wait_secs: u64,

    pub gas: GasConfigToml,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://testnet-rpc.iopn.tech/".to_string(),
            chain_id: 984,
            explorer_url: "https://testnet.iopn.tech".to_string(),
            router_address: builtin(ROUTER_ADDRESS),
            wopn_address: builtin(WOPN_ADDRESS),
            opnt_address: builtin(OPNT_ADDRESS),
            tusdt_address: builtin(TUSDT_ADDRESS),
            vintage_address: builtin(VINTAGE_ADDRESS),
            private_key_file: core_logic::KeyStore::DEFAULT_FILE.to_string(),
            swap_amount: "0.001".to_string(),
            slippage_bps: 500,
            deadline_secs: 1200,
            native_gas_reserve: "0.001".to_string(),
            receipt_timeout_secs: 120,
            approval_timeout_secs: 60,
            receipt_poll_ms: 2000,
            connect_retries: 3,
            connect_backoff_ms: 2000,
            wallet_pause_ms: 1000,
            cycle_wait_secs: 90,
            gas: GasConfigToml::default(),
        }
    }
}

impl SwapConfig {
    /// Loads `path` if it exists, falling back to the built-in network.
    pub fn load(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .build()?;

        let mut config: SwapConfig = settings.try_deserialize().map_err(|e| anyhow::anyhow!(e))?;

        if let Ok(key_file) = std::env::var("OPN_KEY_FILE") {
            config.private_key_file = key_file;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if url::Url::parse(&self.rpc_url).is_err() {
            return Err(ConfigError::InvalidRpcUrl {
                url: self.rpc_url.clone(),
            });
        }
        if self.chain_id == 0 {
            return Err(ConfigError::InvalidValue {
                field: "chain_id".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }
        if self.slippage_bps >= 10_000 {
            return Err(ConfigError::InvalidValue {
                field: "slippage_bps".to_string(),
                reason: format!("{} is not below 10000", self.slippage_bps),
            });
        }
        if self.private_key_file.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "private_key_file".to_string(),
            });
        }
        for (field, value) in [
            ("swap_amount", &self.swap_amount),
            ("native_gas_reserve", &self.native_gas_reserve),
        ] {
            if ethers::utils::parse_ether(value).is_err() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("'{}' is not a decimal amount", value),
                });
            }
        }
        Ok(())
    }

    pub fn gas_config(&self) -> GasConfig {
        GasConfig::from(self.gas.clone())
    }

    pub fn swap_amount_wei(&self) -> Result<U256> {
        ethers::utils::parse_ether(&self.swap_amount).context("Invalid swap_amount")
    }

    pub fn native_reserve_wei(&self) -> Result<U256> {
        ethers::utils::parse_ether(&self.native_gas_reserve).context("Invalid native_gas_reserve")
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_secs(self.receipt_timeout_secs)
    }

    pub fn approval_timeout(&self) -> Duration {
        Duration::from_secs(self.approval_timeout_secs)
    }

    /// Linear backoff for the per-wallet RPC connection.
    pub fn connect_retry(&self) -> RetryConfig {
        RetryConfig::linear(self.connect_retries, self.connect_backoff_ms)
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub fn tx_url(&self, hash: H256) -> String {
        format!("{}/tx/{:?}", self.explorer_url.trim_end_matches('/'), hash)
    }

    pub fn token_symbol(&self, token: TokenRef) -> &'static str {
        match token {
            TokenRef::Native => "OPN",
            TokenRef::Erc20(a) if a == self.wopn_address => "WOPN",
            TokenRef::Erc20(a) if a == self.opnt_address => "OPNT",
            TokenRef::Erc20(a) if a == self.tusdt_address => "tUSDT",
            TokenRef::Erc20(a) if a == self.vintage_address => "VINTAGE",
            TokenRef::Erc20(_) => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SwapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chain_id, 984);
        assert_eq!(
            config.swap_amount_wei().unwrap(),
            U256::from(1_000_000_000_000_000u64)
        );
        assert_eq!(config.gas_config().limit_swap(), 250_000);
    }

    #[test]
    fn test_missing_file_uses_builtin_network() {
        let config = SwapConfig::load("definitely/not/here.toml").unwrap();
        assert_eq!(config.router_address, builtin(ROUTER_ADDRESS));
        assert_eq!(config.cycle_wait_secs, 90);
    }

    #[test]
    fn test_rejects_bad_slippage() {
        let config = SwapConfig {
            slippage_bps: 10_000,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_amount() {
        let config = SwapConfig {
            swap_amount: "lots".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_symbols() {
        let config = SwapConfig::default();
        assert_eq!(config.token_symbol(TokenRef::Native), "OPN");
        assert_eq!(
            config.token_symbol(TokenRef::Erc20(config.opnt_address)),
            "OPNT"
        );
        assert_eq!(
            config.token_symbol(TokenRef::Erc20(Address::zero())),
            "Unknown"
        );
    }

    #[test]
    fn test_connect_retry_follows_config() {
        let config = SwapConfig {
            connect_retries: 5,
            connect_backoff_ms: 250,
            ..Default::default()
        };
        let retry = config.connect_retry();
        assert_eq!(retry.max_retries, 5);
        assert_eq!(retry.base_delay_ms, 250);
    }

    #[test]
    fn test_tx_url() {
        let config = SwapConfig::default();
        let url = config.tx_url(H256::zero());
        assert!(url.starts_with("https://testnet.iopn.tech/tx/0x0000"));
    }
}
