//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },

    #[error("Missing required configuration field: '{field}'")]
    MissingField { field: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Key file and private key errors
#[derive(Error, Debug, Clone)]
pub enum WalletError {
    #[error("Invalid private key format: expected hex string")]
    InvalidKeyFormat,

    #[error("Private key has wrong length: expected 64 hex chars, got {length}")]
    InvalidKeyLength { length: usize },

    #[error("Private key is zero or not below the secp256k1 group order")]
    KeyOutOfRange,

    #[error("I/O error on key file {path}: {msg}")]
    Io { path: String, msg: String },
}

/// Network and RPC-related errors
#[derive(Error, Debug, Clone)]
pub enum NetworkError {
    #[error("Failed to connect to {endpoint} after {attempts} attempts: {reason}")]
    Unreachable {
        endpoint: String,
        attempts: u32,
        reason: String,
    },

    #[error("Chain id mismatch on {endpoint}: expected {expected}, got {actual}")]
    ChainIdMismatch {
        endpoint: String,
        expected: u64,
        actual: u64,
    },
}
