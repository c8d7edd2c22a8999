use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Current theme preference
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DarkModeDto {
    pub enabled: bool,
}
