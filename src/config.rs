//! Connection configuration
//!
//! [`ConnectionConfig`] is the immutable value object every connector
//! consumes. It can be built in code, loaded from a YAML/JSON file, or
//! parsed from a `mysql://` / `postgres://` URL.

use crate::error::{Error, Result, ResultExt};
use crate::types::{EngineKind, SslMode};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use url::Url;

// ============================================================================
// Connection Config
// ============================================================================

/// Credentials and target of a single database connection
///
/// Fields are private; once built the value cannot change. Nothing is
/// defaulted except `ssl_mode` (plaintext) and an absent password (empty).
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    engine: EngineKind,
    host: String,
    port: u16,
    user: String,
    #[serde(default)]
    password: String,
    #[serde(alias = "database_name", alias = "db")]
    database: String,
    #[serde(default)]
    ssl_mode: SslMode,
}

impl ConnectionConfig {
    /// Create a config with TLS disabled
    pub fn new(
        engine: EngineKind,
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            ssl_mode: SslMode::Disable,
        }
    }

    /// Return a copy using the given transport encryption policy
    #[must_use]
    pub fn with_ssl_mode(mut self, ssl_mode: SslMode) -> Self {
        self.ssl_mode = ssl_mode;
        self
    }

    /// Engine the connection targets
    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    /// Hostname or IP address of the server
    pub fn host(&self) -> &str {
        &self.host
    }

    /// TCP port of the server
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Login user
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Login password; empty when the server needs none
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Database to open
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Transport encryption policy
    pub fn ssl_mode(&self) -> SslMode {
        self.ssl_mode
    }

    /// Check the fields every engine needs
    ///
    /// Engine-specific grammar restrictions are checked by the connectors
    /// when they build their descriptor.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::descriptor("host", "must not be empty"));
        }
        if self.host.chars().any(char::is_whitespace) {
            return Err(Error::descriptor("host", "must not contain whitespace"));
        }
        if self.host.contains(['/', '@', '?', '#']) {
            return Err(Error::descriptor("host", "must be a hostname or IP address"));
        }
        if self.port == 0 {
            return Err(Error::descriptor("port", "must be between 1 and 65535"));
        }
        if self.user.is_empty() {
            return Err(Error::descriptor("user", "must not be empty"));
        }
        if self.database.is_empty() {
            return Err(Error::descriptor("database", "must not be empty"));
        }
        Ok(())
    }

    /// Parse a `mysql://` or `postgres://` URL
    ///
    /// The port must be present. `sslmode=` (Postgres) or `tls=` (MySQL)
    /// query parameters select the [`SslMode`].
    pub fn from_url(input: &str) -> Result<Self> {
        let url = Url::parse(input)?;
        let engine: EngineKind = url.scheme().parse()?;

        let host = url
            .host_str()
            .ok_or_else(|| Error::config("Connection URL has no host"))?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = url
            .port()
            .ok_or_else(|| Error::config("Connection URL has no port"))?;

        let user = decode(url.username(), "user")?;
        let password = url
            .password()
            .map(|p| decode(p, "password"))
            .transpose()?
            .unwrap_or_default();
        let database = decode(url.path().trim_start_matches('/'), "database")?;

        let mut ssl_mode = SslMode::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "sslmode" | "tls" | "ssl_mode" => ssl_mode = value.parse()?,
                other => {
                    tracing::debug!("Ignoring unknown connection URL parameter '{}'", other);
                }
            }
        }

        Ok(Self {
            engine,
            host,
            port,
            user,
            password,
            database,
            ssl_mode,
        })
    }

    /// Parse a config from a YAML document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a config from a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a config file; `.json` files are read as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::config(format!("Config file '{}' not found", path.display()))
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            }
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        };
        parsed.with_context(|| format!("Invalid config file '{}'", path.display()))
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"****")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

fn decode(raw: &str, field: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| Error::config(format!("Connection URL {field} is not valid UTF-8: {e}")))
}
