// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the domari scan engine
//!
//! The taxonomy mirrors the failure policy of the scanner: per-test-case
//! and per-parameter errors are recoverable and logged, driver errors from
//! the automated page are never fatal, configuration errors abort before
//! any navigation occurs.

use thiserror::Error;

/// Result type alias for domari operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the scan engine
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (reference driver)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Navigation to a mutated URL failed
    #[error("Navigation failed to {url}: {reason}")]
    Navigation {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// In-page script evaluation failed
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Error raised by the browser automation capability
    #[error("Driver error: {0}")]
    Driver(String),

    /// Configuration error, fatal before any navigation
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a navigation error
    pub fn navigation(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Navigation {
            url: url.into(),
            status: None,
            reason: reason.into(),
        }
    }

    /// Create a navigation error with an HTTP status
    pub fn navigation_with_status(
        url: impl Into<String>,
        status: u16,
        reason: impl Into<String>,
    ) -> Self {
        Error::Navigation {
            url: url.into(),
            status: Some(status),
            reason: reason.into(),
        }
    }

    /// Create an evaluation error
    pub fn evaluation<S: Into<String>>(msg: S) -> Self {
        Error::Evaluation(msg.into())
    }

    /// Create a driver error
    pub fn driver<S: Into<String>>(msg: S) -> Self {
        Error::Driver(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Configuration errors terminate the run before any navigation
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if this error is recoverable within a parameter scan
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Navigation { .. } | Error::Evaluation(_) | Error::Http(_) | Error::Driver(_)
        )
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Navigation { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
