//! # Core Logic - Shared Utilities for the Swap Bot
//!
//! Chain-agnostic building blocks used by the chain crates: key storage,
//! gas tier configuration, retry helpers, logging and the worker runner.
//!
//! ## Modules
//!
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - Core trait definitions
//! - [`utils`] - Utility modules (key store, gas config, retry, logger, runner)

pub mod error;
pub mod traits;
pub(crate) mod utils;

pub use error::{ConfigError, NetworkError, WalletError};
pub use traits::{Spammer, SpammerStats};

// Utils are pub(crate) - only export specific public utilities
pub use utils::{setup_logger, GasConfig, GasConfigToml, GasLimits, KeyStore, PrivateKey, WorkerRunner};

pub use utils::gas::gwei_to_wei;
pub use utils::retry::{with_retry, Backoff, RetryConfig};
