use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub meta: Option<Meta>,
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Meta {
    pub total: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(data: Option<T>, message: Option<String>, meta: Option<Meta>) -> Self {
        Self {
            success: true,
            data,
            message,
            meta,
            errors: None,
        }
    }

    pub fn error(message: Option<String>, errors: Option<Vec<String>>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            message,
            meta: None,
            errors,
        }
    }
}

// =============================================================================
// LOAD STATE
// =============================================================================

/// Result of an asynchronous load as seen by a client: still running (or never
/// started), finished with a value, or failed with a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum LoadState<T> {
    Pending,
    Success(T),
    Failure(String),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        LoadState::Pending
    }
}

impl<T> LoadState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for LoadState<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => LoadState::Success(value),
            Err(e) => LoadState::Failure(e.to_string()),
        }
    }
}
