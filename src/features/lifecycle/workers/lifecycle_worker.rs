use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;

use crate::features::lifecycle::services::{LifecycleScheduler, SweepOutcome};

/// Background worker that asks the scheduler whether a sweep is due
pub struct LifecycleWorker {
    scheduler: Arc<LifecycleScheduler>,
    check_interval: Duration,
}

impl LifecycleWorker {
    pub fn new(scheduler: Arc<LifecycleScheduler>, check_interval: Duration) -> Self {
        Self {
            scheduler,
            check_interval,
        }
    }

    /// Run forever. The first tick fires immediately, so a due sweep runs on
    /// startup.
    pub async fn run(&self) {
        tracing::info!(
            "Starting lifecycle worker (check every {}s, sweep every {}h)",
            self.check_interval.as_secs(),
            self.scheduler.sweep_interval().as_secs() / 3600
        );

        let mut interval = interval(self.check_interval);

        loop {
            interval.tick().await;

            match self.scheduler.run_if_due(Utc::now()).await {
                Ok(SweepOutcome::NoOp) => {}
                Ok(SweepOutcome::Swept(selection)) => {
                    tracing::debug!("Lifecycle sweep selected {} report(s)", selection.count);
                }
                Err(e) => tracing::error!("Error running expiry sweep: {:?}", e),
            }
        }
    }
}
