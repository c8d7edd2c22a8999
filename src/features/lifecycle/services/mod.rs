mod expiry_handler;
mod scheduler;

pub use expiry_handler::{ExpiryHandler, LoggingExpiryHandler};
pub use scheduler::{record_run, should_run, LifecycleScheduler, SweepOutcome, SweepRun};
