//! Common types used throughout pralaya-db
//!
//! Engine selectors and transport options shared by the configuration
//! layer, the connectors and the CLI.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Engine Kind
// ============================================================================

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EngineKind {
    /// MySQL / MariaDB
    #[serde(rename = "mysql", alias = "mariadb")]
    MySql,
    /// PostgreSQL
    #[serde(rename = "postgres", alias = "postgresql", alias = "pg")]
    Postgres,
}

impl EngineKind {
    /// All supported engines, in registration order
    pub const ALL: [EngineKind; 2] = [EngineKind::MySql, EngineKind::Postgres];

    /// Canonical lowercase name
    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::MySql => "mysql",
            EngineKind::Postgres => "postgres",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(EngineKind::MySql),
            "postgres" | "postgresql" | "pg" => Ok(EngineKind::Postgres),
            other => Err(Error::config(format!(
                "Unknown database engine '{other}' (expected mysql or postgres)"
            ))),
        }
    }
}

// ============================================================================
// SSL Mode
// ============================================================================

/// Transport encryption policy for a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SslMode {
    /// Plaintext only
    #[default]
    Disable,
    /// Use TLS when the server offers it (Postgres only; the MySQL connector rejects it)
    Prefer,
    /// Fail unless TLS is negotiated
    Require,
}

impl SslMode {
    /// Value used in Postgres `sslmode=` parameters
    pub fn as_str(self) -> &'static str {
        match self {
            SslMode::Disable => "disable",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
        }
    }
}

impl fmt::Display for SslMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SslMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "disable" | "false" => Ok(SslMode::Disable),
            "prefer" | "preferred" => Ok(SslMode::Prefer),
            "require" | "true" => Ok(SslMode::Require),
            other => Err(Error::config(format!("Unknown ssl mode '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("mysql", EngineKind::MySql)]
    #[test_case("MariaDB", EngineKind::MySql)]
    #[test_case("postgres", EngineKind::Postgres)]
    #[test_case("postgresql", EngineKind::Postgres)]
    #[test_case("PG", EngineKind::Postgres)]
    fn test_engine_from_str(input: &str, expected: EngineKind) {
        assert_eq!(input.parse::<EngineKind>().unwrap(), expected);
    }

    #[test]
    fn test_engine_from_str_unknown() {
        let err = "mongodb".parse::<EngineKind>().unwrap_err();
        assert!(err.to_string().contains("mongodb"));
    }

    #[test]
    fn test_engine_serde() {
        let engine: EngineKind = serde_json::from_str("\"postgresql\"").unwrap();
        assert_eq!(engine, EngineKind::Postgres);
        assert_eq!(serde_json::to_string(&EngineKind::MySql).unwrap(), "\"mysql\"");
    }

    #[test]
    fn test_ssl_mode_default_is_disable() {
        assert_eq!(SslMode::default(), SslMode::Disable);
        assert_eq!(SslMode::default().to_string(), "disable");
    }

    #[test_case("preferred", SslMode::Prefer)]
    #[test_case("true", SslMode::Require)]
    #[test_case("Disable", SslMode::Disable)]
    fn test_ssl_mode_from_str(input: &str, expected: SslMode) {
        assert_eq!(input.parse::<SslMode>().unwrap(), expected);
    }
}
