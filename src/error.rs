//! Error handling for the marketplace client

use std::fmt;
use thiserror::Error;

/// Coarse classification used when surfacing a failure to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input caught before any remote call
    Validation,

    /// Network failure or an error reported by the remote API
    Remote,

    /// A required record does not exist
    NotFound,

    /// Local faults: config, files, decoding
    Local,
}

/// Unified error type for the marketplace client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the backend
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Database query errors
    #[error("Database error: {0}")]
    Database(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Rejected input
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    /// A record that had to exist was missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Payment gateway refused the charge
    #[error("Payment error: {0}")]
    Payment(String),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Filesystem errors from the preferences store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new database error
    pub fn database<T: fmt::Display>(msg: T) -> Self {
        Error::Database(msg.to_string())
    }

    /// Create a new storage error
    pub fn storage<T: fmt::Display>(msg: T) -> Self {
        Error::Storage(msg.to_string())
    }

    /// Create a new validation error for a named field
    pub fn validation<F: Into<String>, T: fmt::Display>(field: F, msg: T) -> Self {
        Error::Validation {
            field: field.into(),
            message: msg.to_string(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(what: T) -> Self {
        Error::NotFound(what.to_string())
    }

    /// Create a new configuration error
    pub fn config<T: fmt::Display>(msg: T) -> Self {
        Error::Config(msg.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation { .. } => ErrorKind::Validation,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::Http(_)
            | Error::Api { .. }
            | Error::Auth(_)
            | Error::Database(_)
            | Error::Storage(_)
            | Error::Payment(_) => ErrorKind::Remote,
            Error::Json(_) | Error::Url(_) | Error::Jwt(_) | Error::Io(_) | Error::Config(_) => {
                ErrorKind::Local
            }
        }
    }

    /// Whether the backend refused the request because of row-level security.
    pub fn is_row_level_security(&self) -> bool {
        let message = match self {
            Error::Api { message, .. } | Error::Database(message) => message,
            _ => return false,
        };
        message.to_lowercase().contains("row-level security")
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_ui_taxonomy() {
        assert_eq!(Error::validation("price", "must be positive").kind(), ErrorKind::Validation);
        assert_eq!(Error::not_found("product 7").kind(), ErrorKind::NotFound);
        assert_eq!(Error::database("boom").kind(), ErrorKind::Remote);
        assert_eq!(Error::config("missing url").kind(), ErrorKind::Local);
    }

    #[test]
    fn detects_row_level_security_messages() {
        let err = Error::Api {
            status: 403,
            message: "new row violates row-level security policy for table \"Usuarios\"".into(),
        };
        assert!(err.is_row_level_security());
        assert!(!Error::database("duplicate key").is_row_level_security());
    }

    #[test]
    fn validation_message_names_the_field() {
        let err = Error::validation("cvv", "must be 3 digits");
        assert_eq!(err.to_string(), "Invalid cvv: must be 3 digits");
    }
}
