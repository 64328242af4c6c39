use std::time::Duration;

use async_trait::async_trait;
use claims::Scheduler;

/// [`Scheduler`] backed by the tokio timer wheel.
///
/// Under `tokio::time::pause()` this follows the simulated clock, so tests
/// can drive poll loops without real delays.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
