pub mod lifecycle;
pub mod photos;
pub mod preferences;
pub mod reports;
