use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::reports::aggregation::SweepSelection;

/// Receives the reports picked by an expiry sweep
#[async_trait]
pub trait ExpiryHandler: Send + Sync {
    async fn handle(&self, selection: &SweepSelection) -> Result<()>;
}

/// Logs the selection and leaves the reports untouched
pub struct LoggingExpiryHandler;

#[async_trait]
impl ExpiryHandler for LoggingExpiryHandler {
    async fn handle(&self, selection: &SweepSelection) -> Result<()> {
        if selection.count == 0 {
            tracing::info!("Expiry sweep selected no reports");
        } else {
            tracing::info!(
                "Expiry sweep selected {} completed report(s): {}",
                selection.count,
                selection.closed_ids.join(", ")
            );
        }
        Ok(())
    }
}
