//! Error types for pralaya-db
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use crate::types::EngineKind;
use thiserror::Error;

/// The main error type for pralaya-db
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Connection Errors
    // ============================================================================
    /// A config field cannot be expressed in the engine's descriptor
    #[error("Cannot build connection descriptor ({field}): {message}")]
    DescriptorConstruction {
        /// Offending config field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// The driver rejected the descriptor or is not available
    #[error("Failed to open {engine} connection: {message}")]
    OpenFailure {
        /// Engine of the connector
        engine: EngineKind,
        /// Driver message
        message: String,
    },

    /// Connecting, authenticating or the liveness check failed
    #[error("{engine} server unreachable: {message}")]
    Unreachable {
        /// Engine of the connector
        engine: EngineKind,
        /// Driver message
        message: String,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Invalid or missing configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// YAML parse error
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON parse error
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Any other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a descriptor construction error
    pub fn descriptor(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DescriptorConstruction {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an open failure
    pub fn open(engine: EngineKind, message: impl Into<String>) -> Self {
        Self::OpenFailure {
            engine,
            message: message.into(),
        }
    }

    /// Create an unreachable error
    pub fn unreachable(engine: EngineKind, message: impl Into<String>) -> Self {
        Self::Unreachable {
            engine,
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether the error came from talking to the server rather than from local input
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Error::Unreachable { .. })
    }
}

/// Result type alias for pralaya-db
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::descriptor("host", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Cannot build connection descriptor (host): must not be empty"
        );

        let err = Error::open(EngineKind::Postgres, "invalid sslmode");
        assert_eq!(
            err.to_string(),
            "Failed to open postgres connection: invalid sslmode"
        );

        let err = Error::unreachable(EngineKind::MySql, "connection refused");
        assert_eq!(err.to_string(), "mysql server unreachable: connection refused");
    }

    #[test]
    fn test_is_connection_failure() {
        assert!(Error::unreachable(EngineKind::MySql, "refused").is_connection_failure());

        assert!(!Error::open(EngineKind::MySql, "bad dsn").is_connection_failure());
        assert!(!Error::descriptor("port", "zero").is_connection_failure());
        assert!(!Error::config("test").is_connection_failure());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
