use std::sync::Arc;

use crate::core::error::Result;
use crate::features::preferences::services::PreferenceStore;
use crate::shared::constants::PREF_DARK_MODE;

/// User-facing settings backed by a `PreferenceStore`
pub struct PreferenceService {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceService {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Light theme unless dark mode was switched on
    pub async fn dark_mode(&self) -> Result<bool> {
        self.store.get_bool(PREF_DARK_MODE, false).await
    }

    pub async fn set_dark_mode(&self, enabled: bool) -> Result<bool> {
        self.store.set_bool(PREF_DARK_MODE, enabled).await?;
        tracing::info!("Dark mode set to {}", enabled);
        Ok(enabled)
    }
}
