// src/error.rs

//! Unified error handling for the archiver.

use std::fmt;

use thiserror::Error;

/// Result type alias for archiver operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Regular expression failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A remote resource could not be fetched
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// An issue page did not have the expected shape
    #[error("Extraction error for {context}: {message}")]
    Extract { context: String, message: String },

    /// The run finished, but some units of work failed along the way
    #[error("{failed} of {total} items failed")]
    Incomplete { failed: usize, total: usize },
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create an extraction error with context.
    pub fn extract(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Extract {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = AppError::fetch("https://example.com/a.pdf", "status 404");
        assert_eq!(
            err.to_string(),
            "Fetch error for https://example.com/a.pdf: status 404"
        );

        let err = AppError::Incomplete {
            failed: 1,
            total: 3,
        };
        assert_eq!(err.to_string(), "1 of 3 items failed");
    }
}
