use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};

/// Small persisted key-value settings.
///
/// Getters fall back to `default` when the key is missing or holds a value
/// of the wrong shape.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get_bool(&self, key: &str, default: bool) -> Result<bool>;

    async fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    async fn get_i64(&self, key: &str, default: i64) -> Result<i64>;

    async fn set_i64(&self, key: &str, value: i64) -> Result<()>;
}

/// Postgres-backed store over the `app_preferences` table
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn get_raw(&self, key: &str) -> Result<Option<String>> {
        sqlx::query_scalar("SELECT value FROM app_preferences WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to read preference {}: {:?}", key, e);
                AppError::StoreUnavailable(e.to_string())
            })
    }

    async fn set_raw(&self, key: &str, value: String) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO app_preferences (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to write preference {}: {:?}", key, e);
            AppError::StoreUnavailable(e.to_string())
        })?;

        Ok(())
    }
}

fn parse_or_default<T: std::str::FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        None => default,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Preference {} holds unexpected value '{}'", key, value);
            default
        }),
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        let raw = self.get_raw(key).await?;
        Ok(parse_or_default(key, raw, default))
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_raw(key, value.to_string()).await
    }

    async fn get_i64(&self, key: &str, default: i64) -> Result<i64> {
        let raw = self.get_raw(key).await?;
        Ok(parse_or_default(key, raw, default))
    }

    async fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.set_raw(key, value.to_string()).await
    }
}
