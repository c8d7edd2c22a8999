use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::core::config::LifecycleConfig;
use crate::core::error::{AppError, Result};
use crate::features::lifecycle::services::ExpiryHandler;
use crate::features::preferences::services::PreferenceStore;
use crate::features::reports::aggregation::{self, SweepSelection};
use crate::features::reports::services::ReportStore;
use crate::shared::constants::PREF_LAST_SWEEP_AT;
use crate::shared::types::LoadState;

/// Whether a sweep is due. `last_sweep_at == 0` means never swept.
pub fn should_run(now_ms: i64, last_sweep_at: i64, interval: Duration) -> bool {
    if last_sweep_at == 0 {
        return true;
    }
    let interval_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_sub(last_sweep_at) > interval_ms
}

/// Timestamp to persist after a successful sweep
pub fn record_run(now_ms: i64) -> i64 {
    now_ms
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// Interval not yet elapsed
    NoOp,
    Swept(SweepSelection),
}

/// One completed scheduler check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRun {
    pub checked_at: DateTime<Utc>,
    pub outcome: SweepOutcome,
}

/// Runs the periodic expiry sweep and persists when it last succeeded.
pub struct LifecycleScheduler {
    reports: Arc<dyn ReportStore>,
    preferences: Arc<dyn PreferenceStore>,
    expiry_handler: Arc<dyn ExpiryHandler>,
    sweep_interval: Duration,
    expiry_after: Duration,
    // Serializes read-check-sweep-write on the persisted timestamp
    run_lock: Mutex<()>,
    last_run: RwLock<LoadState<SweepRun>>,
}

impl LifecycleScheduler {
    pub fn new(
        config: &LifecycleConfig,
        reports: Arc<dyn ReportStore>,
        preferences: Arc<dyn PreferenceStore>,
        expiry_handler: Arc<dyn ExpiryHandler>,
    ) -> Self {
        Self {
            reports,
            preferences,
            expiry_handler,
            sweep_interval: config.sweep_interval,
            expiry_after: config.expiry_after,
            run_lock: Mutex::new(()),
            last_run: RwLock::new(LoadState::Pending),
        }
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Sweep if the interval has elapsed since the last successful sweep.
    ///
    /// On failure the persisted timestamp is left as it was, so the next
    /// check tries again.
    pub async fn run_if_due(&self, now: DateTime<Utc>) -> Result<SweepOutcome> {
        let _guard = self.run_lock.lock().await;

        let result = self.sweep_if_due(now).await;

        *self.last_run.write().await = LoadState::from(result.as_ref().map(|outcome| SweepRun {
            checked_at: now,
            outcome: outcome.clone(),
        }));

        result
    }

    async fn sweep_if_due(&self, now: DateTime<Utc>) -> Result<SweepOutcome> {
        let now_ms = now.timestamp_millis();
        let last_sweep_at = self.preferences.get_i64(PREF_LAST_SWEEP_AT, 0).await?;

        if !should_run(now_ms, last_sweep_at, self.sweep_interval) {
            tracing::debug!("Expiry sweep not due, last ran at {}", last_sweep_at);
            return Ok(SweepOutcome::NoOp);
        }

        let expiry_after = chrono::Duration::from_std(self.expiry_after)
            .map_err(|e| AppError::Internal(format!("Invalid expiry threshold: {}", e)))?;

        let snapshot = self.reports.fetch_all().await?;
        let selection = aggregation::sweep_expired(&snapshot, now, expiry_after);

        self.expiry_handler.handle(&selection).await?;
        self.preferences
            .set_i64(PREF_LAST_SWEEP_AT, record_run(now_ms))
            .await?;

        tracing::info!(
            "Expiry sweep finished: {} of {} report(s) selected",
            selection.count,
            snapshot.len()
        );

        Ok(SweepOutcome::Swept(selection))
    }

    pub async fn last_run(&self) -> LoadState<SweepRun> {
        self.last_run.read().await.clone()
    }

    /// Persisted time of the last successful sweep, `None` if never swept
    pub async fn last_sweep_at(&self) -> Result<Option<DateTime<Utc>>> {
        let millis = self.preferences.get_i64(PREF_LAST_SWEEP_AT, 0).await?;
        if millis == 0 {
            return Ok(None);
        }
        Ok(DateTime::<Utc>::from_timestamp_millis(millis))
    }
}
