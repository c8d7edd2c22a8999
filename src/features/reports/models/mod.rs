mod report;
mod report_category;

pub use report::{Report, ReportPriority, ReportRow, ReportStatus};
pub use report_category::ReportCategory;

/// Lowercase and strip everything but letters and digits, so that
/// "in_progress", "InProgress" and "in progress" compare equal.
pub(crate) fn normalize_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}
