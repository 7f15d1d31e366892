use anyhow::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SpammerStats {
    pub success: u64,
    pub failed: u64,
}

impl SpammerStats {
    pub fn record(&mut self, success: bool) {
        if success {
            self.success += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn merge(&mut self, other: SpammerStats) {
        self.success += other.success;
        self.failed += other.failed;
    }

    pub fn total(&self) -> u64 {
        self.success + self.failed
    }

    /// Success percentage, 0.0 when nothing was attempted.
    pub fn success_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.success as f64 / total as f64 * 100.0
        }
    }
}

#[async_trait]
pub trait Spammer: Send + Sync {
    /// Run until the token is cancelled, returning accumulated stats.
    async fn start(&self, cancellation_token: CancellationToken) -> Result<SpammerStats>;
}
