use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// The timing seam of the workflow engine.
///
/// The simulation waits out fixed delays; a real authorization backend would
/// implement this by resolving when the processor reports the step complete.
/// Either way the engine's phase sequence and cancellation contract stay the
/// same.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

pub type SharedDelay = Arc<dyn Delay>;
