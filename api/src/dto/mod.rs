pub mod auth_dto;
pub mod error;

pub use auth_dto::*;
pub use error::*;
