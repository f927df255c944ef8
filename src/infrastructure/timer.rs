use crate::domain::ports::Delay;
use async_trait::async_trait;
use std::time::Duration;

/// `Delay` implementation over the tokio clock.
///
/// Under a paused test runtime these waits follow the virtual clock, which
/// keeps timing tests deterministic and instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
