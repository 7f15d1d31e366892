//! OPN testnet swap bot.
//!
//! Cycles through every wallet in the key file and performs weighted-random
//! swaps against a Uniswap-V2 style router, with typed fallbacks at each
//! step of the submission pipeline.

pub mod chain;
pub mod config;
pub mod pairs;
pub mod spammer;
pub mod task;
pub mod tx;
pub mod utils;

pub use config::SwapConfig;
pub use spammer::{RunSettings, SwapSpammer};
