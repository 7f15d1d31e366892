use crate::chain::ChainRpc;
use ethers::prelude::*;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub hash: H256,
    pub success: bool,
    pub block_number: Option<U64>,
    pub gas_used: Option<U256>,
    pub effective_gas_price: Option<U256>,
}

impl Receipt {
    /// Gas actually paid, when the node reports both parts.
    pub fn fee(&self) -> Option<U256> {
        Some(self.gas_used? * self.effective_gas_price?)
    }

    pub fn fee_display(&self) -> String {
        match self.fee() {
            Some(fee) => format!("{} OPN", ethers::utils::format_ether(fee)),
            None => "unknown".to_string(),
        }
    }
}

impl From<&TransactionReceipt> for Receipt {
    fn from(r: &TransactionReceipt) -> Self {
        Self {
            hash: r.transaction_hash,
            success: r.status == Some(U64::from(1)),
            block_number: r.block_number,
            gas_used: r.gas_used,
            effective_gas_price: r.effective_gas_price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiptOutcome {
    Confirmed(Receipt),
    Reverted(Receipt),
    /// No receipt within the timeout. The transaction may still land.
    Pending,
}

impl ReceiptOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, ReceiptOutcome::Confirmed(_))
    }
}

/// Polls for a receipt every `poll` until `timeout` worth of attempts are
/// used up. Errors on individual polls are ignored.
pub async fn wait_for_receipt(
    rpc: &dyn ChainRpc,
    hash: H256,
    timeout: Duration,
    poll: Duration,
) -> ReceiptOutcome {
    let attempts = (timeout.as_millis() / poll.as_millis().max(1)).max(1);

    for attempt in 0..attempts {
        match rpc.receipt(hash).await {
            Ok(Some(raw)) => {
                let receipt = Receipt::from(&raw);
                return if receipt.success {
                    ReceiptOutcome::Confirmed(receipt)
                } else {
                    ReceiptOutcome::Reverted(receipt)
                };
            }
            Ok(None) => {}
            Err(e) => debug!("Receipt poll {} for {:?} failed: {:#}", attempt + 1, hash, e),
        }
        if attempt + 1 < attempts {
            sleep(poll).await;
        }
    }

    ReceiptOutcome::Pending
}
