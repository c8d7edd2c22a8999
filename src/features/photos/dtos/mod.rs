pub mod photo_dto;

pub use photo_dto::*;
