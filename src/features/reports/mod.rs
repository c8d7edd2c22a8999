pub mod aggregation;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::{PgReportStore, ReportService, ReportStore};
