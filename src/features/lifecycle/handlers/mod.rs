pub mod lifecycle_handler;

pub use lifecycle_handler::*;
