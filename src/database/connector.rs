//! Connector trait and connection handle
//!
//! Every engine follows the same template: build descriptor, open the
//! session, then ping it. Only a session that answered the ping is handed
//! to the caller, wrapped in a [`ConnectionHandle`].

use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::types::EngineKind;
use std::fmt;
use std::time::Duration;

/// Placeholder used instead of the password in loggable descriptors
pub const MASKED_PASSWORD: &str = "****";

// ============================================================================
// Connector Trait
// ============================================================================

/// A driver able to turn a [`ConnectionConfig`] into a verified connection
pub trait Connector: Send + Sync {
    /// Engine this connector speaks
    fn engine(&self) -> EngineKind;

    /// Build the engine's descriptor using `password` in place of the configured one
    fn build_descriptor(&self, config: &ConnectionConfig, password: &str) -> Result<String>;

    /// Parse `descriptor` and establish a session, bounded by `timeout`
    ///
    /// Descriptor syntax problems are [`Error::OpenFailure`]; failing to
    /// reach or authenticate against the server is [`Error::Unreachable`].
    fn open(&self, descriptor: &str, timeout: Duration) -> Result<Session>;

    /// Connection descriptor for `config`
    fn descriptor(&self, config: &ConnectionConfig) -> Result<String> {
        self.build_descriptor(config, config.password())
    }

    /// Connection descriptor for `config` that is safe to log
    fn masked_descriptor(&self, config: &ConnectionConfig) -> Result<String> {
        if config.password().is_empty() {
            self.descriptor(config)
        } else {
            self.build_descriptor(config, MASKED_PASSWORD)
        }
    }

    /// Open a connection and verify it is alive
    ///
    /// Makes a single attempt. On any failure the partially opened session
    /// is dropped before the error is returned.
    fn connect(&self, config: &ConnectionConfig, timeout: Duration) -> Result<ConnectionHandle> {
        let engine = self.engine();
        if config.engine() != engine {
            return Err(Error::descriptor(
                "engine",
                format!(
                    "{} config given to the {engine} connector",
                    config.engine()
                ),
            ));
        }

        let descriptor = self.descriptor(config)?;
        let target = self.masked_descriptor(config)?;
        tracing::debug!("Opening {} connection to {}", engine, target);

        let mut session = self.open(&descriptor, timeout).map_err(|e| {
            tracing::warn!("Opening {} connection to {} failed: {}", engine, target, e);
            e
        })?;

        if let Err(e) = session.ping(timeout) {
            tracing::warn!("Liveness check against {} failed: {}", target, e);
            return Err(e);
        }

        tracing::info!("Connected to {} ({})", target, engine);
        Ok(ConnectionHandle {
            engine,
            target,
            session,
        })
    }
}

// ============================================================================
// Session
// ============================================================================

/// An opened driver session that has not necessarily been verified yet
pub struct Session {
    inner: SessionInner,
}

enum SessionInner {
    MySql(Box<mysql::Conn>),
    Postgres(Box<postgres::Client>),
}

impl Session {
    pub(crate) fn mysql(conn: mysql::Conn) -> Self {
        Self {
            inner: SessionInner::MySql(Box::new(conn)),
        }
    }

    pub(crate) fn postgres(client: postgres::Client) -> Self {
        Self {
            inner: SessionInner::Postgres(Box::new(client)),
        }
    }

    /// Engine behind this session
    pub fn engine(&self) -> EngineKind {
        match self.inner {
            SessionInner::MySql(_) => EngineKind::MySql,
            SessionInner::Postgres(_) => EngineKind::Postgres,
        }
    }

    /// Round trip to the server
    ///
    /// MySQL sessions carry their read/write timeouts from when they were
    /// opened; `timeout` bounds the Postgres probe.
    pub fn ping(&mut self, timeout: Duration) -> Result<()> {
        match &mut self.inner {
            SessionInner::MySql(conn) => {
                use mysql::prelude::Queryable;
                conn.query_drop("SELECT 1")
                    .map_err(|e| Error::unreachable(EngineKind::MySql, e.to_string()))
            }
            SessionInner::Postgres(client) => client
                .is_valid(timeout)
                .map_err(|e| Error::unreachable(EngineKind::Postgres, e.to_string())),
        }
    }

    fn close(self) -> Result<()> {
        match self.inner {
            // COM_QUIT is sent when the connection is dropped
            SessionInner::MySql(conn) => {
                drop(conn);
                Ok(())
            }
            SessionInner::Postgres(client) => client
                .close()
                .map_err(|e| Error::Other(format!("Failed to close postgres connection: {e}"))),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("engine", &self.engine())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Connection Handle
// ============================================================================

/// A live, verified database session owned by the caller
///
/// The underlying socket is released when the handle is dropped or
/// [`close`](Self::close)d.
pub struct ConnectionHandle {
    engine: EngineKind,
    target: String,
    session: Session,
}

impl ConnectionHandle {
    /// Engine behind this handle
    pub fn engine(&self) -> EngineKind {
        self.engine
    }

    /// Descriptor of the target with the password masked
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Check the session is still usable
    pub fn ping(&mut self, timeout: Duration) -> Result<()> {
        self.session.ping(timeout)
    }

    /// Underlying MySQL connection, if this is a MySQL handle
    pub fn mysql_mut(&mut self) -> Option<&mut mysql::Conn> {
        match &mut self.session.inner {
            SessionInner::MySql(conn) => Some(conn.as_mut()),
            SessionInner::Postgres(_) => None,
        }
    }

    /// Underlying Postgres client, if this is a Postgres handle
    pub fn postgres_mut(&mut self) -> Option<&mut postgres::Client> {
        match &mut self.session.inner {
            SessionInner::Postgres(client) => Some(client.as_mut()),
            SessionInner::MySql(_) => None,
        }
    }

    /// Terminate the session gracefully
    pub fn close(self) -> Result<()> {
        tracing::debug!("Closing connection to {}", self.target);
        self.session.close()
    }
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("engine", &self.engine)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
