//! Modules layer - infrastructure that features build on
//!
//! Image compression and photo storage.

pub mod imaging;
pub mod storage;
