use super::{ApprovalOutcome, SwapFailure, SwapMethod, SwapOutcome, UnwrapOutcome};
use crate::chain::ChainRpc;
use crate::config::SwapConfig;
use crate::pairs::{Route, SwapPair, TokenRef};
use crate::tx::abi::{erc20_contract, router_contract};
use crate::tx::encoding;
use crate::tx::{wait_for_receipt, ContractCall, ReceiptOutcome, SubmitOutcome, Submitter};
use crate::utils::gas::{GasOp, GasPriority};
use anyhow::{Context, Result};
use ethers::abi::{Detokenize, Tokenize};
use ethers::contract::BaseContract;
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::utils::format_ether;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Minimum acceptable output for a swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinOut {
    Quoted { expected: U256, min: U256 },
    /// No quote available; the swap accepts any output.
    Fallback,
}

impl MinOut {
    pub fn amount(&self) -> U256 {
        match self {
            MinOut::Quoted { min, .. } => *min,
            MinOut::Fallback => U256::zero(),
        }
    }
}

/// `floor(expected * (10000 - bps) / 10000)` without overflowing on large
/// quotes.
pub fn apply_slippage(expected: U256, slippage_bps: u64) -> U256 {
    let keep = U256::from(10_000u64.saturating_sub(slippage_bps));
    let denom = U256::from(10_000u64);
    expected / denom * keep + expected % denom * keep / denom
}

/// Runs swaps for one wallet over one RPC session.
pub struct SwapExecutor {
    submitter: Submitter,
    config: Arc<SwapConfig>,
    router: BaseContract,
    erc20: BaseContract,
}

impl SwapExecutor {
    pub fn new(rpc: Arc<dyn ChainRpc>, wallet: LocalWallet, config: Arc<SwapConfig>) -> Result<Self> {
        Ok(Self {
            submitter: Submitter::new(rpc, wallet, config.clone()),
            config,
            router: router_contract()?,
            erc20: erc20_contract()?,
        })
    }

    pub fn address(&self) -> Address {
        self.submitter.address()
    }

    pub fn config(&self) -> &SwapConfig {
        &self.config
    }

    pub fn rpc(&self) -> &dyn ChainRpc {
        self.submitter.rpc()
    }

    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }

    pub fn erc20(&self) -> &BaseContract {
        &self.erc20
    }

    pub(crate) fn symbol_of(&self, token: Address) -> &'static str {
        self.config.token_symbol(TokenRef::Erc20(token))
    }

    async fn read_call<T: Tokenize, D: Detokenize>(
        &self,
        contract: &BaseContract,
        to: Address,
        function: &str,
        args: T,
    ) -> Result<D> {
        let data = contract.encode(function, args)?;
        let tx: TypedTransaction = Eip1559TransactionRequest::new()
            .from(self.address())
            .to(to)
            .data(data)
            .into();
        let output = self
            .rpc()
            .call(&tx)
            .await
            .with_context(|| format!("{} call failed", function))?;
        Ok(contract.decode_output(function, output)?)
    }

    pub(crate) async fn read_erc20<T: Tokenize, D: Detokenize>(
        &self,
        token: Address,
        function: &str,
        args: T,
    ) -> Result<D> {
        self.read_call(&self.erc20, token, function, args).await
    }

    pub async fn token_balance(&self, token: Address) -> Result<U256> {
        self.read_erc20(token, "balanceOf", self.address())
            .await
            .with_context(|| format!("Failed to read {} balance", self.symbol_of(token)))
    }

    /// Router quote with slippage applied, or [`MinOut::Fallback`] when the
    /// router cannot quote the path.
    pub async fn quote_min_out(&self, amount_in: U256, path: &[Address]) -> MinOut {
        let quote: Result<Vec<U256>> = self
            .read_call(
                &self.router,
                self.config.router_address,
                "getAmountsOut",
                (amount_in, path.to_vec()),
            )
            .await;

        match quote.ok().and_then(|amounts| amounts.last().copied()) {
            Some(expected) => {
                let min = apply_slippage(expected, self.config.slippage_bps);
                info!("Expected output: {}", format_ether(expected));
                info!(
                    "Minimum output ({} bps slippage): {}",
                    self.config.slippage_bps,
                    format_ether(min)
                );
                MinOut::Quoted { expected, min }
            }
            None => {
                warn!("Could not get quote, using minOut = 0");
                MinOut::Fallback
            }
        }
    }

    /// One swap, retried once at high priority when the node rejects the
    /// priority fee.
    pub async fn swap(&self, pair: &SwapPair, amount_in: U256) -> Result<SwapOutcome> {
        let outcome = self.swap_tokens(pair, amount_in, GasPriority::Normal).await?;
        if outcome.is_priority_fee_error() {
            warn!("Gas issue, retrying with high priority...");
            return self.swap_tokens(pair, amount_in, GasPriority::High).await;
        }
        Ok(outcome)
    }

    pub async fn swap_tokens(
        &self,
        pair: &SwapPair,
        amount_in: U256,
        priority: GasPriority,
    ) -> Result<SwapOutcome> {
        let Some(route) = pair.route() else {
            warn!("Refusing {}: native to native is not a swap", pair.name);
            return Ok(SwapOutcome::Failed(SwapFailure::SameAsset));
        };

        info!(
            "Swapping {} {} -> {}",
            format_ether(amount_in),
            self.config.token_symbol(pair.from),
            self.config.token_symbol(pair.to)
        );

        let deadline = deadline(self.config.deadline_secs)?;
        let path = route.path(self.config.wopn_address);

        match route {
            Route::NativeToToken { .. } => {
                self.swap_native_for_token(amount_in, &path, deadline, priority)
                    .await
            }
            Route::TokenToNative { token } => {
                self.swap_token_for_native(token, amount_in, &path, deadline, priority)
                    .await
            }
            Route::TokenToToken { from, .. } => {
                self.swap_token_for_token(from, amount_in, &path, deadline, priority)
                    .await
            }
        }
    }

    async fn swap_native_for_token(
        &self,
        amount_in: U256,
        path: &[Address],
        deadline: U256,
        priority: GasPriority,
    ) -> Result<SwapOutcome> {
        let needed = amount_in + self.config.native_reserve_wei()?;
        let balance = match self.rpc().balance(self.address()).await {
            Ok(balance) => balance,
            Err(e) => {
                warn!("Could not read OPN balance, assuming zero: {:#}", e);
                U256::zero()
            }
        };
        if balance < needed {
            error!(
                "Insufficient OPN balance: have {}, need {}",
                format_ether(balance),
                format_ether(needed)
            );
            return Ok(SwapOutcome::Failed(SwapFailure::InsufficientNativeBalance {
                balance,
                needed,
            }));
        }

        let min_out = self.quote_min_out(amount_in, path).await;
        let encoding =
            encoding::swap_native_for_tokens(min_out.amount(), path, self.address(), deadline);
        info!("Sending transaction (method: {})...", encoding.label());

        let call = ContractCall::new(self.config.router_address, encoding, GasOp::Swap)
            .with_value(amount_in);
        let submitted = self.submitter.prepare_and_send(&call, priority).await;
        Ok(self.confirm(submitted, SwapMethod::RawSelector).await)
    }

    async fn swap_token_for_native(
        &self,
        token: Address,
        amount_in: U256,
        path: &[Address],
        deadline: U256,
        priority: GasPriority,
    ) -> Result<SwapOutcome> {
        if let Some(failure) = self.prepare_token_spend(token, amount_in, priority).await? {
            return Ok(SwapOutcome::Failed(failure));
        }

        let min_out = self.quote_min_out(amount_in, path).await;
        let encoding = encoding::swap_tokens_for_native(
            amount_in,
            min_out.amount(),
            path,
            self.address(),
            deadline,
        );
        info!("Sending transaction (method: {})...", encoding.label());

        let call = ContractCall::new(self.config.router_address, encoding, GasOp::Swap);
        let submitted = self.submitter.prepare_and_send(&call, priority).await;
        if !matches!(submitted, SubmitOutcome::SendFailed { .. }) {
            return Ok(self.confirm(submitted, SwapMethod::RawSelector).await);
        }

        warn!("Custom selector failed, using fallback method...");
        let encoding = encoding::swap_exact_tokens_for_tokens(
            &self.router,
            amount_in,
            min_out.amount(),
            path,
            self.address(),
            deadline,
        )?;
        let call = ContractCall::new(self.config.router_address, encoding, GasOp::Swap);
        let submitted = self.submitter.prepare_and_send(&call, priority).await;

        let outcome = self
            .confirm(submitted, SwapMethod::StandardFallback { unwrapped: false })
            .await;
        let receipt = match outcome {
            SwapOutcome::Confirmed { receipt, .. } => receipt,
            failed => return Ok(failed),
        };

        let unwrapped = match self.unwrap_wrapped_native(priority).await {
            UnwrapOutcome::Unwrapped { .. } => true,
            UnwrapOutcome::NothingToUnwrap => false,
            UnwrapOutcome::Failed(reason) => {
                warn!("Swap confirmed but unwrap failed: {}", reason);
                false
            }
        };

        Ok(SwapOutcome::Confirmed {
            receipt,
            method: SwapMethod::StandardFallback { unwrapped },
        })
    }

    async fn swap_token_for_token(
        &self,
        from: Address,
        amount_in: U256,
        path: &[Address],
        deadline: U256,
        priority: GasPriority,
    ) -> Result<SwapOutcome> {
        if let Some(failure) = self.prepare_token_spend(from, amount_in, priority).await? {
            return Ok(SwapOutcome::Failed(failure));
        }

        let min_out = self.quote_min_out(amount_in, path).await;
        info!("Building transaction...");
        let encoding = encoding::swap_exact_tokens_for_tokens(
            &self.router,
            amount_in,
            min_out.amount(),
            path,
            self.address(),
            deadline,
        )?;
        let call = ContractCall::new(self.config.router_address, encoding, GasOp::Swap);
        let submitted = self.submitter.prepare_and_send(&call, priority).await;
        Ok(self.confirm(submitted, SwapMethod::Standard).await)
    }

    /// Balance and allowance checks ahead of spending an ERC-20.
    async fn prepare_token_spend(
        &self,
        token: Address,
        amount_in: U256,
        priority: GasPriority,
    ) -> Result<Option<SwapFailure>> {
        let balance = self.token_balance(token).await?;
        if balance < amount_in {
            error!(
                "Insufficient {} balance: have {}, need {}",
                self.symbol_of(token),
                format_ether(balance),
                format_ether(amount_in)
            );
            return Ok(Some(SwapFailure::InsufficientTokenBalance {
                balance,
                needed: amount_in,
            }));
        }

        match self.ensure_allowance(token, amount_in, priority).await {
            ApprovalOutcome::Failed(reason) => Ok(Some(SwapFailure::ApprovalFailed(reason))),
            ApprovalOutcome::AlreadyApproved | ApprovalOutcome::Approved(_) => Ok(None),
        }
    }

    async fn confirm(&self, submitted: SubmitOutcome, method: SwapMethod) -> SwapOutcome {
        let hash = match submitted {
            SubmitOutcome::Sent { hash, .. } => hash,
            SubmitOutcome::InsufficientFunds { required, balance } => {
                return SwapOutcome::Failed(SwapFailure::InsufficientFunds { required, balance })
            }
            SubmitOutcome::SendFailed { reason } => {
                return SwapOutcome::Failed(SwapFailure::SendFailed(reason))
            }
        };

        info!("Waiting for confirmation...");
        match wait_for_receipt(
            self.rpc(),
            hash,
            self.config.receipt_timeout(),
            self.config.receipt_poll_interval(),
        )
        .await
        {
            ReceiptOutcome::Confirmed(receipt) => {
                info!(
                    "Confirmed in block {} | gas used {} | fee {}",
                    receipt
                        .block_number
                        .map(|b| b.to_string())
                        .unwrap_or_else(|| "?".to_string()),
                    receipt.gas_used.unwrap_or_default(),
                    receipt.fee_display()
                );
                info!("Explorer: {}", self.config.tx_url(hash));
                SwapOutcome::Confirmed { receipt, method }
            }
            ReceiptOutcome::Reverted(_) => {
                error!("Transaction reverted: {}", self.config.tx_url(hash));
                SwapOutcome::Failed(SwapFailure::Reverted(hash))
            }
            ReceiptOutcome::Pending => {
                warn!(
                    "Not confirmed within {:?}, it may still land: {}",
                    self.config.receipt_timeout(),
                    self.config.tx_url(hash)
                );
                SwapOutcome::Failed(SwapFailure::Pending(hash))
            }
        }
    }
}

fn deadline(secs: u64) -> Result<U256> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs();
    Ok(U256::from(now + secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_slippage_floors() {
        assert_eq!(apply_slippage(U256::from(1_000_000u64), 500), U256::from(950_000u64));
        // 12345 * 9500 / 10000 = 11727.75
        assert_eq!(apply_slippage(U256::from(12_345u64), 500), U256::from(11_727u64));
        assert_eq!(apply_slippage(U256::from(1u64), 500), U256::zero());
    }

    #[test]
    fn test_apply_slippage_large_quote() {
        let expected = U256::MAX;
        let min = apply_slippage(expected, 500);
        assert!(min < expected);
        let (denom, keep) = (U256::from(10_000u64), U256::from(9_500u64));
        assert_eq!(min, expected / denom * keep + expected % denom * keep / denom);
    }

    #[test]
    fn test_min_out_amount() {
        assert_eq!(MinOut::Fallback.amount(), U256::zero());
        assert_eq!(
            MinOut::Quoted {
                expected: U256::from(10),
                min: U256::from(9)
            }
            .amount(),
            U256::from(9)
        );
    }
}
