//! # Core Logic - Gas Configuration
//!
//! Gas price tiers and per-operation gas limits. This module provides
//! configuration only; the chain crate reads the live gas price and applies
//! these tiers.

use serde::Deserialize;

/// Gas limit caps per operation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasLimits {
    pub swap: u64,
    pub approve: u64,
    pub wrap: u64,
}

impl Default for GasLimits {
    fn default() -> Self {
        Self {
            swap: 250_000,
            approve: 100_000,
            wrap: 120_000,
        }
    }
}

/// Configuration for gas management
#[derive(Debug, Clone)]
pub struct GasConfig {
    /// Floor applied to every computed max fee.
    pub min_gwei: f64,
    /// Normal tier, used when the node reports an unusable price.
    pub default_gwei: f64,
    /// High priority tier.
    pub high_gwei: f64,
    pub priority_cap_gwei: f64,
    /// Priority fee paid when no live price is available.
    pub fallback_priority_gwei: f64,
    pub limits: GasLimits,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            min_gwei: 10.0,
            default_gwei: 15.0,
            high_gwei: 25.0,
            priority_cap_gwei: 2.0,
            fallback_priority_gwei: 1.0,
            limits: GasLimits::default(),
        }
    }
}

impl GasConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tiers(mut self, min_gwei: f64, default_gwei: f64, high_gwei: f64) -> Self {
        self.min_gwei = min_gwei;
        self.default_gwei = default_gwei;
        self.high_gwei = high_gwei;
        self
    }

    pub fn with_priority_cap(mut self, priority_cap_gwei: f64) -> Self {
        self.priority_cap_gwei = priority_cap_gwei;
        self
    }

    pub fn min_wei(&self) -> u64 {
        gwei_to_wei(self.min_gwei)
    }

    pub fn default_wei(&self) -> u64 {
        gwei_to_wei(self.default_gwei)
    }

    pub fn high_wei(&self) -> u64 {
        gwei_to_wei(self.high_gwei)
    }

    pub fn priority_cap_wei(&self) -> u64 {
        gwei_to_wei(self.priority_cap_gwei)
    }

    pub fn fallback_priority_wei(&self) -> u64 {
        gwei_to_wei(self.fallback_priority_gwei)
    }

    pub fn limit_swap(&self) -> u64 {
        self.limits.swap
    }

    pub fn limit_approve(&self) -> u64 {
        self.limits.approve
    }

    pub fn limit_wrap(&self) -> u64 {
        self.limits.wrap
    }
}

/// Convert gwei to wei as u64
pub fn gwei_to_wei(gwei: f64) -> u64 {
    (gwei * 1e9).round() as u64
}

/// Deserialize helper for GasConfig from TOML
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GasConfigToml {
    pub min_gwei: Option<f64>,
    pub default_gwei: Option<f64>,
    pub high_gwei: Option<f64>,
    pub priority_cap_gwei: Option<f64>,
    pub fallback_priority_gwei: Option<f64>,
    pub limit_swap: Option<u64>,
    pub limit_approve: Option<u64>,
    pub limit_wrap: Option<u64>,
}

impl From<GasConfigToml> for GasConfig {
    fn from(toml: GasConfigToml) -> Self {
        let defaults = GasConfig::default();
        Self {
            min_gwei: toml.min_gwei.unwrap_or(defaults.min_gwei),
            default_gwei: toml.default_gwei.unwrap_or(defaults.default_gwei),
            high_gwei: toml.high_gwei.unwrap_or(defaults.high_gwei),
            priority_cap_gwei: toml.priority_cap_gwei.unwrap_or(defaults.priority_cap_gwei),
            fallback_priority_gwei: toml
                .fallback_priority_gwei
                .unwrap_or(defaults.fallback_priority_gwei),
            limits: GasLimits {
                swap: toml.limit_swap.unwrap_or(defaults.limits.swap),
                approve: toml.limit_approve.unwrap_or(defaults.limits.approve),
                wrap: toml.limit_wrap.unwrap_or(defaults.limits.wrap),
            },
        }
    }
}
