pub mod preference_handler;

pub use preference_handler::*;
