//! Authentication route handlers

pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;

pub use super::AppState;
