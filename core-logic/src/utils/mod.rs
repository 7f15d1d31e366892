//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod gas;
pub(crate) mod key_store;
pub(crate) mod logger;
pub(crate) mod retry;
pub(crate) mod runner;

// Selective exports - only public utilities
pub use gas::{GasConfig, GasConfigToml, GasLimits};
pub use key_store::{KeyStore, PrivateKey};
pub use logger::setup_logger;
pub use runner::WorkerRunner;
