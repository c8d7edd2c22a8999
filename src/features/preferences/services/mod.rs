mod preference_service;
mod preference_store;

pub use preference_service::PreferenceService;
pub use preference_store::{PgPreferenceStore, PreferenceStore};
