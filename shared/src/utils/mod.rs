//! Common utility functions

pub mod ip;
pub mod validation;

// Re-export commonly used utilities
pub use validation::*;
