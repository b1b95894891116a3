//! Common validation utilities

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Maximum accepted password length (bcrypt only looks at the first 72 bytes)
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Username length bounds
pub const MIN_USERNAME_LENGTH: usize = 1;
pub const MAX_USERNAME_LENGTH: usize = 64;

// Printable characters without whitespace
static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_.@+-]+$").unwrap()
});

/// Validation error with field-level details
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub code: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

/// Collection of validation errors
#[derive(Debug, Default)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>, code: impl Into<String>) {
        self.add(ValidationError::new(field, message, code));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// First error, used when a single human-readable reason is reported
    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first()
    }

    pub fn to_field_errors(&self) -> HashMap<String, Vec<String>> {
        let mut field_errors: HashMap<String, Vec<String>> = HashMap::new();
        for error in &self.errors {
            field_errors
                .entry(error.field.clone())
                .or_default()
                .push(error.message.clone());
        }
        field_errors
    }
}

/// Validate registration credentials
pub fn validate_credentials(username: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if !validators::not_empty(username) {
        errors.add_error("username", "Username is required", "required");
    } else if !validators::length_between(username, MIN_USERNAME_LENGTH, MAX_USERNAME_LENGTH) {
        errors.add_error("username", "Username is too long", "length");
    } else if !USERNAME_REGEX.is_match(username) {
        errors.add_error("username", "Username contains invalid characters", "pattern");
    }

    if password.is_empty() {
        errors.add_error("password", "Password is required", "required");
    } else if password.len() < MIN_PASSWORD_LENGTH {
        errors.add_error(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LENGTH),
            "length",
        );
    } else if password.len() > MAX_PASSWORD_LENGTH {
        errors.add_error(
            "password",
            format!("Password must be at most {} bytes", MAX_PASSWORD_LENGTH),
            "length",
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Common validation functions
pub mod validators {
    /// Check if a string is not empty
    pub fn not_empty(value: &str) -> bool {
        !value.trim().is_empty()
    }

    /// Check if a string length is within bounds
    pub fn length_between(value: &str, min: usize, max: usize) -> bool {
        let len = value.chars().count();
        len >= min && len <= max
    }
}
