//! Swap execution for a single wallet.

pub mod approve;
pub mod swap;
pub mod unwrap;

pub use approve::ApprovalOutcome;
pub use swap::SwapExecutor;
pub use unwrap::UnwrapOutcome;

use crate::tx::Receipt;
use ethers::types::{H256, U256};

/// How a confirmed swap was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapMethod {
    RawSelector,
    Standard,
    /// Raw selector failed to submit; the standard router call went
    /// through instead, optionally followed by an unwrap of WOPN.
    StandardFallback { unwrapped: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapFailure {
    SameAsset,
    InsufficientTokenBalance { balance: U256, needed: U256 },
    InsufficientNativeBalance { balance: U256, needed: U256 },
    InsufficientFunds { required: U256, balance: U256 },
    ApprovalFailed(String),
    SendFailed(String),
    Reverted(H256),
    Pending(H256),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    Confirmed { receipt: Receipt, method: SwapMethod },
    Failed(SwapFailure),
}

impl SwapOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SwapOutcome::Confirmed { .. })
    }

    pub fn is_priority_fee_error(&self) -> bool {
        match self {
            SwapOutcome::Failed(SwapFailure::SendFailed(reason)) => {
                crate::tx::submit::is_priority_fee_error(reason)
            }
            _ => false,
        }
    }

    /// Short description for the result log line.
    pub fn summary(&self) -> String {
        match self {
            SwapOutcome::Confirmed { receipt, method } => format!(
                "{:?} via {:?}, block {}, fee {}",
                receipt.hash,
                method,
                receipt
                    .block_number
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "?".to_string()),
                receipt.fee_display()
            ),
            SwapOutcome::Failed(SwapFailure::SameAsset) => "same asset on both sides".to_string(),
            SwapOutcome::Failed(SwapFailure::InsufficientTokenBalance { balance, needed }) => {
                format!(
                    "insufficient token balance ({} < {})",
                    ethers::utils::format_ether(*balance),
                    ethers::utils::format_ether(*needed)
                )
            }
            SwapOutcome::Failed(SwapFailure::InsufficientNativeBalance { balance, needed }) => {
                format!(
                    "insufficient OPN balance ({} < {})",
                    ethers::utils::format_ether(*balance),
                    ethers::utils::format_ether(*needed)
                )
            }
            SwapOutcome::Failed(SwapFailure::InsufficientFunds { required, balance }) => format!(
                "insufficient funds for gas ({} < {})",
                ethers::utils::format_ether(*balance),
                ethers::utils::format_ether(*required)
            ),
            SwapOutcome::Failed(SwapFailure::ApprovalFailed(reason)) => {
                format!("approval failed: {}", reason)
            }
            SwapOutcome::Failed(SwapFailure::SendFailed(reason)) => {
                format!("send failed: {}", reason)
            }
            SwapOutcome::Failed(SwapFailure::Reverted(hash)) => format!("reverted: {:?}", hash),
            SwapOutcome::Failed(SwapFailure::Pending(hash)) => {
                format!("not confirmed in time: {:?}", hash)
            }
        }
    }
}
