#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use core_logic::NetworkError;
use ethers::abi::{self, Token};
use ethers::prelude::*;
use ethers::types::transaction::eip2718::TypedTransaction;
use opn_swapper::chain::{ChainRpc, Connector};
use opn_swapper::task::SwapExecutor;
use opn_swapper::SwapConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

pub const BALANCE_OF: [u8; 4] = [0x70, 0xa0, 0x82, 0x31];
pub const ALLOWANCE: [u8; 4] = [0xdd, 0x62, 0xed, 0x3e];
pub const GET_AMOUNTS_OUT: [u8; 4] = [0xd0, 0x6c, 0xa6, 0x1f];
pub const APPROVE: [u8; 4] = [0x09, 0x5e, 0xa7, 0xb3];
pub const SWAP_EXACT_TOKENS: [u8; 4] = [0x38, 0xed, 0x17, 0x39];
pub const WITHDRAW: [u8; 4] = [0x2e, 0x1a, 0x7d, 0x4d];
pub const SWAP_NATIVE_FOR_TOKENS: [u8; 4] = [0xa2, 0x4f, 0xef, 0xef];
pub const SWAP_TOKENS_FOR_NATIVE: [u8; 4] = [0xe0, 0xf4, 0x4d, 0xf2];

pub const GWEI: u64 = 1_000_000_000;

pub fn ether(amount: &str) -> U256 {
    ethers::utils::parse_ether(amount).unwrap()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptMode {
    Success,
    Reverted,
    Never,
}

#[derive(Debug)]
struct State {
    gas_price: Option<U256>,
    native_balance: U256,
    token_balances: HashMap<Address, U256>,
    allowance: U256,
    amounts_out: Option<U256>,
    estimate: Option<U256>,
    failing_selectors: HashMap<[u8; 4], String>,
    receipt_mode: ReceiptMode,
    sent: Vec<TypedTransaction>,
    attempted: Vec<TypedTransaction>,
}

/// In-memory chain with scripted answers. Records every send attempt and
/// every accepted send.
#[derive(Debug)]
pub struct FakeChain {
    state: Mutex<State>,
}

impl Default for FakeChain {
    fn default() -> Self {
        Self {
            state: Mutex::new(State {
                gas_price: Some(U256::from(20 * GWEI)),
                native_balance: ether("10"),
                token_balances: HashMap::new(),
                allowance: U256::MAX,
                amounts_out: Some(ether("2")),
                estimate: Some(U256::from(150_000)),
                failing_selectors: HashMap::new(),
                receipt_mode: ReceiptMode::Success,
                sent: Vec::new(),
                attempted: Vec::new(),
            }),
        }
    }
}

fn selector_of(tx: &TypedTransaction) -> [u8; 4] {
    let mut selector = [0u8; 4];
    if let Some(data) = tx.data() {
        if data.len() >= 4 {
            selector.copy_from_slice(&data[..4]);
        }
    }
    selector
}

impl FakeChain {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn set_gas_price(&self, price: Option<U256>) {
        self.with_state(|s| s.gas_price = price);
    }

    pub fn set_native_balance(&self, balance: U256) {
        self.with_state(|s| s.native_balance = balance);
    }

    pub fn set_token_balance(&self, token: Address, balance: U256) {
        self.with_state(|s| {
            s.token_balances.insert(token, balance);
        });
    }

    pub fn set_allowance(&self, allowance: U256) {
        self.with_state(|s| s.allowance = allowance);
    }

    pub fn set_amounts_out(&self, amount: Option<U256>) {
        self.with_state(|s| s.amounts_out = amount);
    }

    pub fn set_estimate(&self, estimate: Option<U256>) {
        self.with_state(|s| s.estimate = estimate);
    }

    pub fn fail_sends_with(&self, selector: [u8; 4], reason: &str) {
        self.with_state(|s| {
            s.failing_selectors.insert(selector, reason.to_string());
        });
    }

    pub fn set_receipt_mode(&self, mode: ReceiptMode) {
        self.with_state(|s| s.receipt_mode = mode);
    }

    pub fn sent(&self) -> Vec<TypedTransaction> {
        self.with_state(|s| s.sent.clone())
    }

    pub fn sent_selectors(&self) -> Vec<[u8; 4]> {
        self.sent().iter().map(selector_of).collect()
    }

    /// Every transaction handed to `send_signed`, rejected ones included.
    pub fn attempted(&self) -> Vec<TypedTransaction> {
        self.with_state(|s| s.attempted.clone())
    }

    pub fn send_attempts(&self) -> usize {
        self.with_state(|s| s.attempted.len())
    }
}

#[async_trait]
impl ChainRpc for FakeChain {
    async fn chain_id(&self) -> Result<u64> {
        Ok(984)
    }

    async fn gas_price(&self) -> Result<U256> {
        self.with_state(|s| s.gas_price)
            .ok_or_else(|| anyhow!("gas price unavailable"))
    }

    async fn balance(&self, _address: Address) -> Result<U256> {
        Ok(self.with_state(|s| s.native_balance))
    }

    async fn nonce(&self, _address: Address) -> Result<U256> {
        Ok(U256::from(self.with_state(|s| s.sent.len())))
    }

    async fn estimate_gas(&self, _tx: &TypedTransaction) -> Result<U256> {
        self.with_state(|s| s.estimate)
            .ok_or_else(|| anyhow!("execution reverted"))
    }

    async fn call(&self, tx: &TypedTransaction) -> Result<Bytes> {
        let to = tx.to_addr().copied().unwrap_or_default();
        let data = tx.data().cloned().unwrap_or_default();

        let tokens = match selector_of(tx) {
            BALANCE_OF => {
                let balance = self.with_state(|s| s.token_balances.get(&to).copied().unwrap_or_default());
                vec![Token::Uint(balance)]
            }
            ALLOWANCE => vec![Token::Uint(self.with_state(|s| s.allowance))],
            GET_AMOUNTS_OUT => {
                let decoded = abi::decode(
                    &[
                        abi::ParamType::Uint(256),
                        abi::ParamType::Array(Box::new(abi::ParamType::Address)),
                    ],
                    &data[4..],
                )?;
                let amount_in = decoded[0].clone();
                let out = self
                    .with_state(|s| s.amounts_out)
                    .ok_or_else(|| anyhow!("execution reverted: INSUFFICIENT_LIQUIDITY"))?;
                vec![Token::Array(vec![amount_in, Token::Uint(out)])]
            }
            other => return Err(anyhow!("unexpected call 0x{}", hex::encode(other))),
        };
        Ok(Bytes::from(abi::encode(&tokens)))
    }

    async fn send_signed(&self, tx: &TypedTransaction, _signature: &Signature) -> Result<H256> {
        let selector = selector_of(tx);
        self.with_state(|s| {
            s.attempted.push(tx.clone());
            if let Some(reason) = s.failing_selectors.get(&selector) {
                return Err(anyhow!(reason.clone()));
            }
            s.sent.push(tx.clone());
            Ok(H256::from_low_u64_be(s.sent.len() as u64))
        })
    }

    async fn receipt(&self, hash: H256) -> Result<Option<TransactionReceipt>> {
        let status = match self.with_state(|s| s.receipt_mode) {
            ReceiptMode::Success => 1u64,
            ReceiptMode::Reverted => 0u64,
            ReceiptMode::Never => return Ok(None),
        };
        Ok(Some(TransactionReceipt {
            transaction_hash: hash,
            status: Some(U64::from(status)),
            block_number: Some(U64::from(1234)),
            gas_used: Some(U256::from(120_000)),
            effective_gas_price: Some(U256::from(15 * GWEI)),
            ..Default::default()
        }))
    }
}

pub struct FakeConnector {
    pub chain: Arc<FakeChain>,
    pub reachable: bool,
    /// Runs on every connect, before the reachability check.
    pub on_connect: Option<Box<dyn Fn() + Send + Sync>>,
}

impl FakeConnector {
    pub fn new(chain: &Arc<FakeChain>, reachable: bool) -> Self {
        Self {
            chain: chain.clone(),
            reachable,
            on_connect: None,
        }
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self) -> Result<Arc<dyn ChainRpc>, NetworkError> {
        if let Some(hook) = &self.on_connect {
            hook();
        }
        if !self.reachable {
            return Err(NetworkError::Unreachable {
                endpoint: "fake".to_string(),
                attempts: 4,
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.chain.clone())
    }
}

/// Fast timings so receipt waits and pauses do not slow the tests.
pub fn test_config() -> SwapConfig {
    SwapConfig {
        receipt_poll_ms: 1,
        receipt_timeout_secs: 1,
        approval_timeout_secs: 1,
        wallet_pause_ms: 0,
        cycle_wait_secs: 0,
        ..Default::default()
    }
}

pub fn wallet() -> LocalWallet {
    KEY.parse::<LocalWallet>().unwrap()
}

pub fn executor(chain: &Arc<FakeChain>, config: SwapConfig) -> SwapExecutor {
    SwapExecutor::new(chain.clone(), wallet(), Arc::new(config)).unwrap()
}
