use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::interval;
use tokio_util::sync::CancellationToken;

use super::RateLimiter;

/// Periodically remove expired rate-limit windows until `cancel_token` fires.
pub fn spawn_sweeper(
    limiter: RateLimiter,
    sweep_interval: Duration,
    cancel_token: CancellationToken,
) -> JoinHandle<()> {
    let mut interval = interval(sweep_interval);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    tokio::spawn(async move {
        tracing::debug!(
            interval_secs = sweep_interval.as_secs(),
            "Rate limit sweeper started"
        );
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    break;
                }
                _ = interval.tick() => {
                    limiter.sweep_expired();
                }
            }
        }
        tracing::debug!("Rate limit sweeper stopped");
    })
}
