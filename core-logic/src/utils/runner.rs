use crate::traits::{Spammer, SpammerStats};
use anyhow::Result;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub struct WorkerRunner;

impl WorkerRunner {
    /// Runs the spammer until Ctrl+C cancels it.
    pub async fn run_spammer(spammer: &dyn Spammer) -> Result<SpammerStats> {
        let token = CancellationToken::new();
        let cloned_token = token.clone();

        let listener = tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("🛑 Received Ctrl+C. Stopping...");
                    cloned_token.cancel();
                }
                Err(err) => {
                    error!("Unable to listen for shutdown signal: {}", err);
                }
            }
        });

        let result = Self::run_with_token(spammer, token).await;
        listener.abort();
        result
    }

    /// Runs the spammer against an externally owned token.
    pub async fn run_with_token(
        spammer: &dyn Spammer,
        token: CancellationToken,
    ) -> Result<SpammerStats> {
        let start_time = std::time::Instant::now();
        let stats = spammer.start(token).await?;

        info!("🛑 Stopped by user.");
        info!(
            "Total Time: {:.1}s | Total Success: {} | Total Fail: {} | Success Rate: {:.2}%",
            start_time.elapsed().as_secs_f64(),
            stats.success,
            stats.failed,
            stats.success_rate()
        );

        Ok(stats)
    }
}
