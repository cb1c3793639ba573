//! Polling loop for generation results.
//!
//! ComfyUI exposes no completion callback; the only way to learn a job
//! finished is to query `/history/{prompt_id}` until an output artifact shows
//! up. Anything short of an artifact — upstream hiccups, empty bodies, the
//! id not being listed yet — means "not ready" and costs one retry from the
//! budget. Only exhausting the budget is fatal.
use std::time::Duration;

use crate::comfyui::client::ComfyClient;
use crate::comfyui::outputs::{find_artifact, GenerationMode};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub timeout: Duration,
}

impl PollConfig {
    pub fn new(interval: Duration, timeout: Duration) -> Self {
        PollConfig { interval, timeout }
    }

    /// Retry budget: how many interval-spaced attempts fit in the wall-clock
    /// timeout. Always at least one.
    pub fn max_retries(&self) -> u64 {
        let interval = self.interval.as_millis().max(1);
        ((self.timeout.as_millis() / interval) as u64).max(1)
    }
}

/// Poll `/history/{prompt_id}` until the extractor finds an artifact or the
/// budget runs out. Returns the artifact reference on success.
pub async fn poll_until_complete(
    client: &ComfyClient,
    prompt_id: &str,
    mode: GenerationMode,
    config: PollConfig,
) -> AppResult<String> {
    let max_retries = config.max_retries();

    for attempt in 1..=max_retries {
        tracing::info!("Polling attempt {}/{} for {}", attempt, max_retries, prompt_id);

        match client.history(prompt_id).await {
            Ok(Some(entry)) => {
                if let Some(artifact) = find_artifact(&entry, mode) {
                    tracing::info!("Generation {} complete: {}", prompt_id, artifact);
                    return Ok(artifact);
                }
            }
            Ok(None) => {}
            Err(e) => {
                // Transient as far as the loop is concerned.
                tracing::warn!("History check for {} failed: {}", prompt_id, e);
            }
        }

        tokio::time::sleep(config.interval).await;
    }

    tracing::error!("Polling budget exhausted for {}", prompt_id);
    Err(AppError::Timeout(config.timeout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_budget_divides_timeout_by_interval() {
        let cfg = PollConfig::new(Duration::from_secs(10), Duration::from_secs(15 * 60));
        assert_eq!(cfg.max_retries(), 90);

        let cfg = PollConfig::new(Duration::from_secs(3), Duration::from_secs(15 * 60));
        assert_eq!(cfg.max_retries(), 300);
    }

    #[test]
    fn retry_budget_is_at_least_one() {
        let cfg = PollConfig::new(Duration::from_secs(10), Duration::from_secs(1));
        assert_eq!(cfg.max_retries(), 1);
    }
}
