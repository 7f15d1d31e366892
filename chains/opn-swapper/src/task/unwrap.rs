use super::swap::SwapExecutor;
use crate::tx::{wait_for_receipt, CallEncoding, ContractCall, ReceiptOutcome, SubmitOutcome};
use crate::utils::gas::{GasOp, GasPriority};
use ethers::prelude::*;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnwrapOutcome {
    NothingToUnwrap,
    Unwrapped { amount: U256, hash: H256 },
    Failed(String),
}

impl SwapExecutor {
    /// Converts the wallet's whole WOPN balance back to OPN with a single
    /// `withdraw`.
    pub async fn unwrap_wrapped_native(&self, priority: GasPriority) -> UnwrapOutcome {
        let wopn = self.config().wopn_address;

        let amount = match self.token_balance(wopn).await {
            Ok(amount) => amount,
            Err(e) => {
                warn!("Could not read WOPN balance: {:#}", e);
                return UnwrapOutcome::Failed(format!("{:#}", e));
            }
        };
        if amount.is_zero() {
            return UnwrapOutcome::NothingToUnwrap;
        }

        info!(
            "Unwrapping {} WOPN -> OPN...",
            ethers::utils::format_ether(amount)
        );
        let encoding = match CallEncoding::standard(self.erc20(), "withdraw", amount) {
            Ok(encoding) => encoding,
            Err(e) => return UnwrapOutcome::Failed(format!("{:#}", e)),
        };
        let call = ContractCall::new(wopn, encoding, GasOp::Wrap);

        let hash = match self.submitter().prepare_and_send(&call, priority).await {
            SubmitOutcome::Sent { hash, .. } => hash,
            SubmitOutcome::InsufficientFunds { .. } => {
                return UnwrapOutcome::Failed("insufficient funds for unwrap".to_string())
            }
            SubmitOutcome::SendFailed { reason } => return UnwrapOutcome::Failed(reason),
        };

        let config = self.config();
        match wait_for_receipt(
            self.rpc(),
            hash,
            config.approval_timeout(),
            config.receipt_poll_interval(),
        )
        .await
        {
            ReceiptOutcome::Confirmed(_) => {
                info!("Unwrapped to OPN");
                UnwrapOutcome::Unwrapped { amount, hash }
            }
            ReceiptOutcome::Reverted(_) => UnwrapOutcome::Failed(format!("unwrap {:?} reverted", hash)),
            ReceiptOutcome::Pending => UnwrapOutcome::Failed(format!("unwrap {:?} timed out", hash)),
        }
    }
}
