// =============================================================================
// REPORT CONSTANTS
// =============================================================================

/// Severity assigned when a record carries none
pub const DEFAULT_SEVERITY: i16 = 3;

/// Lowest severity selected by the "urgent" shortcut filter
pub const URGENT_SEVERITY: u8 = 4;

/// Length of the trailing window used by the popular-this-week view
pub const POPULARITY_WINDOW_DAYS: i64 = 7;

// =============================================================================
// PREFERENCE KEYS
// =============================================================================

/// Boolean preference: client theme
pub const PREF_DARK_MODE: &str = "dark_mode";

/// Integer preference: epoch milliseconds of the last successful expiry sweep
pub const PREF_LAST_SWEEP_AT: &str = "last_sweep_at";
