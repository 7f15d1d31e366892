use crate::chain::Connector;
use crate::config::SwapConfig;
use crate::pairs::{default_pairs, PairSelector, SwapPair};
use crate::task::SwapExecutor;
use anyhow::{Context, Result};
use async_trait::async_trait;
use colored::*;
use core_logic::traits::{Spammer, SpammerStats};
use core_logic::{KeyStore, PrivateKey};
use ethers::prelude::*;
use rand::rngs::OsRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument, Span};

/// Where the run loop currently is. Every transition goes through
/// [`SwapSpammer::drive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    CycleStart,
    PerWallet { index: usize },
    PerSwap { wallet: usize, swap: u32 },
    CycleEnd,
    Wait,
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub swaps_per_wallet: u32,
    pub swap_delay: Duration,
    pub single_wallet: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            swaps_per_wallet: 1,
            swap_delay: Duration::from_secs(10),
            single_wallet: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub wallets: usize,
    pub skipped_wallets: usize,
    pub stats: SpammerStats,
}

struct WalletSession {
    index: usize,
    executor: SwapExecutor,
    stats: SpammerStats,
    span: Span,
}

pub struct SwapSpammer {
    config: Arc<SwapConfig>,
    settings: RunSettings,
    key_store: KeyStore,
    connector: Arc<dyn Connector>,
    selector: PairSelector,
    amount_in: U256,
}

impl SwapSpammer {
    pub fn new(
        config: Arc<SwapConfig>,
        settings: RunSettings,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        let selector = PairSelector::new(default_pairs(&config))?;
        let amount_in = config.swap_amount_wei()?;
        Ok(Self {
            key_store: KeyStore::new(&config.private_key_file),
            config,
            settings,
            connector,
            selector,
            amount_in,
        })
    }

    /// Replaces the built-in pair list.
    pub fn with_pairs(mut self, pairs: Vec<SwapPair>) -> Result<Self> {
        self.selector = PairSelector::new(pairs)?;
        Ok(self)
    }

    /// Runs exactly `cycles` cycles without the trailing wait.
    pub async fn run_cycles(
        &self,
        token: &CancellationToken,
        cycles: u64,
    ) -> Result<Vec<CycleReport>> {
        self.drive(token, Some(cycles)).await
    }

    /// Drives the cycle state machine until cancelled or, when given,
    /// `max_cycles` cycles have completed. A cycle cut short by
    /// cancellation is still reported.
    pub async fn drive(
        &self,
        token: &CancellationToken,
        max_cycles: Option<u64>,
    ) -> Result<Vec<CycleReport>> {
        let mut reports = Vec::new();
        let mut state = CycleState::CycleStart;
        let mut cycle = 0u64;
        let mut wallets = 0usize;
        let mut report: Option<CycleReport> = None;
        let mut session: Option<WalletSession> = None;

        while !token.is_cancelled() {
            state = match state {
                CycleState::CycleStart => {
                    cycle += 1;
                    info!("{}", format!("========== Cycle {} ==========", cycle).bold());
                    let mut current = CycleReport {
                        cycle,
                        ..Default::default()
                    };
                    let next = match self.wallet_count() {
                        Ok(count) => {
                            info!("Found {} wallet(s) in {:?}", count, self.key_store.path());
                            current.wallets = count;
                            wallets = count;
                            CycleState::PerWallet { index: 0 }
                        }
                        Err(e) => {
                            error!("Failed to load wallets: {:#}", e);
                            CycleState::CycleEnd
                        }
                    };
                    report = Some(current);
                    next
                }

                CycleState::PerWallet { index } if index >= wallets => CycleState::CycleEnd,

                CycleState::PerWallet { index } => {
                    match self.open_wallet(index, wallets).await {
                        Ok(opened) => {
                            session = Some(opened);
                            CycleState::PerSwap {
                                wallet: index,
                                swap: 0,
                            }
                        }
                        Err(e) => {
                            error!("Skipping wallet {}/{}: {:#}", index + 1, wallets, e);
                            if let Some(current) = report.as_mut() {
                                current.skipped_wallets += 1;
                            }
                            CycleState::PerWallet { index: index + 1 }
                        }
                    }
                }

                CycleState::PerSwap { wallet, swap } => match session.as_mut() {
                    None => CycleState::PerWallet { index: wallet + 1 },
                    Some(current) if swap >= self.settings.swaps_per_wallet => {
                        self.close_wallet(current, wallets);
                        session = None;
                        if !pause(token, Duration::from_millis(self.config.wallet_pause_ms)).await {
                            break;
                        }
                        CycleState::PerWallet { index: wallet + 1 }
                    }
                    Some(current) => {
                        let result = tokio::select! {
                            _ = token.cancelled() => None,
                            success = self.run_swap(current, swap) => Some(success),
                        };
                        let Some(success) = result else {
                            break;
                        };

                        current.stats.record(success);
                        if let Some(current) = report.as_mut() {
                            current.stats.record(success);
                        }

                        let last = swap + 1 >= self.settings.swaps_per_wallet;
                        if !last && !pause(token, self.settings.swap_delay).await {
                            break;
                        }
                        CycleState::PerSwap {
                            wallet,
                            swap: swap + 1,
                        }
                    }
                },

                CycleState::CycleEnd => {
                    if let Some(done) = report.take() {
                        log_cycle(&done);
                        reports.push(done);
                    }
                    if max_cycles.is_some_and(|max| cycle >= max) {
                        return Ok(reports);
                    }
                    CycleState::Wait
                }

                CycleState::Wait => {
                    info!("Waiting {}s before next cycle...", self.config.cycle_wait_secs);
                    if !pause(token, Duration::from_secs(self.config.cycle_wait_secs)).await {
                        break;
                    }
                    CycleState::CycleStart
                }
            };
        }

        if let Some(partial) = report.take() {
            info!("Cycle {} interrupted", partial.cycle);
            reports.push(partial);
        }
        Ok(reports)
    }

    fn wallet_count(&self) -> Result<usize> {
        if self.settings.single_wallet {
            self.key_store.load_one()?;
            return Ok(1);
        }
        Ok(self.key_store.key_count()?)
    }

    /// Reads the key for `index` from the key file. The key is dropped once
    /// the signer is built, so only the open wallet's secret is in memory.
    fn wallet_at(&self, index: usize) -> Result<LocalWallet> {
        let key: PrivateKey = self
            .key_store
            .load_at(index)?
            .with_context(|| format!("Key {} no longer in {:?}", index + 1, self.key_store.path()))?;
        let wallet = LocalWallet::from_bytes(key.as_bytes()).context("Invalid private key")?;
        Ok(wallet.with_chain_id(self.config.chain_id))
    }

    async fn open_wallet(&self, index: usize, total: usize) -> Result<WalletSession> {
        let wallet = self.wallet_at(index)?;
        let address = wallet.address();
        let span = info_span!("wallet", id = index + 1);

        span.in_scope(|| info!("Running wallet {}/{}: {:?}", index + 1, total, address));
        let rpc = self.connector.connect().instrument(span.clone()).await?;
        let executor = SwapExecutor::new(rpc, wallet, self.config.clone())?;

        Ok(WalletSession {
            index,
            executor,
            stats: SpammerStats::default(),
            span,
        })
    }

    fn close_wallet(&self, session: &WalletSession, total: usize) {
        session.span.in_scope(|| {
            info!(
                "Wallet {}/{} done | Success: {} | Failed: {}",
                session.index + 1,
                total,
                session.stats.success,
                session.stats.failed
            )
        });
    }

    /// One weighted-random swap. True iff it produced a confirmed receipt.
    async fn run_swap(&self, session: &WalletSession, swap: u32) -> bool {
        let pair = self.selector.pick(&mut OsRng);
        let started = Instant::now();
        let wallet_id = session.index + 1;

        async {
            info!(
                "Swap {}/{}: {}",
                swap + 1,
                self.settings.swaps_per_wallet,
                pair.name
            );

            let result = session.executor.swap(pair, self.amount_in).await;
            let duration = colored_duration(started.elapsed());

            match result {
                Ok(outcome) if outcome.is_success() => {
                    info!(
                        target: "swap_result",
                        "[WL:{}] SUCCESS [{}] {} in {}",
                        wallet_id,
                        pair.name,
                        outcome.summary(),
                        duration
                    );
                    true
                }
                Ok(outcome) => {
                    warn!(
                        target: "swap_result",
                        "[WL:{}] FAILED [{}] {} in {}",
                        wallet_id,
                        pair.name,
                        outcome.summary(),
                        duration
                    );
                    false
                }
                Err(e) => {
                    error!(
                        target: "swap_result",
                        "[WL:{}] FAILED [{}] {:#} in {}",
                        wallet_id,
                        pair.name,
                        e,
                        duration
                    );
                    false
                }
            }
        }
        .instrument(session.span.clone())
        .await
    }
}

#[async_trait]
impl Spammer for SwapSpammer {
    async fn start(&self, cancellation_token: CancellationToken) -> Result<SpammerStats> {
        info!(
            "Swap bot started on chain {} ({} swap(s) per wallet, {:?} between swaps)",
            self.config.chain_id, self.settings.swaps_per_wallet, self.settings.swap_delay
        );

        let reports = self.drive(&cancellation_token, None).await?;
        let mut stats = SpammerStats::default();
        for report in &reports {
            stats.merge(report.stats);
        }
        Ok(stats)
    }
}

/// Sleeps unless cancelled first. False means the run should stop.
async fn pause(token: &CancellationToken, duration: Duration) -> bool {
    if duration.is_zero() {
        return !token.is_cancelled();
    }
    tokio::select! {
        _ = token.cancelled() => false,
        _ = sleep(duration) => true,
    }
}

fn colored_duration(elapsed: Duration) -> ColoredString {
    let secs = elapsed.as_secs_f64();
    let text = format!("{:.1}s", secs);
    if secs < 30.0 {
        text.green()
    } else if secs < 60.0 {
        text.truecolor(255, 165, 0)
    } else {
        text.red()
    }
}

fn log_cycle(report: &CycleReport) {
    info!(
        "Cycle {} complete | Wallets: {} (skipped {}) | Success: {} | Failed: {} | Success Rate: {:.1}%",
        report.cycle,
        report.wallets,
        report.skipped_wallets,
        report.stats.success,
        report.stats.failed,
        report.stats.success_rate()
    );
}
