//! Error handling for the marketplace client

use std::fmt;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the marketplace client
#[derive(Error, Debug)]
pub enum Error {
    /// A form field or input value failed validation
    #[error("{0}")]
    Validation(String),

    /// An account with this email already exists
    #[error("An account already exists for {0}")]
    DuplicateAccount(String),

    /// Email and password do not match
    #[error("Invalid email or password")]
    InvalidCredential,

    /// A profile or listing is missing
    #[error("{0} not found")]
    NotFound(String),

    /// The caller may not perform this operation
    #[error("{0}")]
    Forbidden(String),

    /// A backend service rejected the request
    #[error("Remote service error: {0}")]
    Remote(String),

    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(what: T) -> Self {
        Error::NotFound(what.to_string())
    }

    /// Create a new forbidden error
    pub fn forbidden<T: fmt::Display>(msg: T) -> Self {
        Error::Forbidden(msg.to_string())
    }

    /// Create a new remote service error
    pub fn remote<T: fmt::Display>(msg: T) -> Self {
        Error::Remote(msg.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    /// Whether the failure came from talking to a backend service
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::Remote(_) | Error::Http(_) | Error::Json(_) | Error::Url(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_classification() {
        assert!(Error::remote("boom").is_remote());
        assert!(!Error::InvalidCredential.is_remote());
        assert!(!Error::validation("Email is required").is_remote());
    }

    #[test]
    fn test_validation_message_is_bare() {
        assert_eq!(
            Error::validation("Price is required").to_string(),
            "Price is required"
        );
        assert_eq!(Error::not_found("Listing abc").to_string(), "Listing abc not found");
    }
}
