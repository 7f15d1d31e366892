use super::swap::SwapExecutor;
use crate::tx::{wait_for_receipt, CallEncoding, ContractCall, Receipt, ReceiptOutcome, SubmitOutcome};
use crate::utils::gas::{GasOp, GasPriority};
use ethers::prelude::*;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalOutcome {
    AlreadyApproved,
    Approved(Receipt),
    Failed(String),
}

/// 999,999,999 whole tokens, enough that the router never needs a second
/// approval in practice.
pub fn approval_amount() -> U256 {
    U256::from(999_999_999u64) * U256::exp10(18)
}

impl SwapExecutor {
    /// Makes sure the router may spend `amount` of `token`, sending one
    /// approval when the current allowance is short.
    pub async fn ensure_allowance(
        &self,
        token: Address,
        amount: U256,
        priority: GasPriority,
    ) -> ApprovalOutcome {
        let router = self.config().router_address;
        let symbol = self.symbol_of(token);

        let current: U256 = match self
            .read_erc20(token, "allowance", (self.address(), router))
            .await
        {
            Ok(current) => current,
            Err(e) => {
                error!("Approval error: could not read {} allowance: {:#}", symbol, e);
                return ApprovalOutcome::Failed(format!("{:#}", e));
            }
        };
        if current >= amount {
            return ApprovalOutcome::AlreadyApproved;
        }

        info!("Approving {}...", symbol);
        let encoding = match CallEncoding::standard(self.erc20(), "approve", (router, approval_amount())) {
            Ok(encoding) => encoding,
            Err(e) => return ApprovalOutcome::Failed(format!("{:#}", e)),
        };
        let call = ContractCall::new(token, encoding, GasOp::Approve);

        let hash = match self.submitter().prepare_and_send(&call, priority).await {
            SubmitOutcome::Sent { hash, .. } => hash,
            SubmitOutcome::InsufficientFunds { .. } => {
                return ApprovalOutcome::Failed("insufficient funds for approval".to_string())
            }
            SubmitOutcome::SendFailed { reason } => return ApprovalOutcome::Failed(reason),
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
            ReceiptOutcome::Confirmed(receipt) => {
                info!("{} approved successfully", symbol);
                ApprovalOutcome::Approved(receipt)
            }
            ReceiptOutcome::Reverted(_) => {
                error!("Approval failed: {:?} reverted", hash);
                ApprovalOutcome::Failed(format!("approval {:?} reverted", hash))
            }
            ReceiptOutcome::Pending => {
                error!("Approval failed: {:?} not confirmed in time", hash);
                ApprovalOutcome::Failed(format!("approval {:?} timed out", hash))
            }
        }
    }
}
