//! Driver registry
//!
//! Connectors are registered once, explicitly, at process start via
//! [`register_drivers`]. Afterwards the registry is read-only and shared by
//! every caller.

use super::connector::{ConnectionHandle, Connector};
use super::mysql::MySqlConnector;
use super::postgres::PostgresConnector;
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::types::EngineKind;
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::time::Duration;

static DRIVERS: OnceCell<DriverRegistry> = OnceCell::new();

/// Register the built-in MySQL and Postgres connectors for this process
///
/// Calling it again returns the registry created by the first call.
pub fn register_drivers() -> &'static DriverRegistry {
    DRIVERS.get_or_init(|| {
        let registry = DriverRegistry::with_builtin();
        tracing::debug!("Registered database drivers: {:?}", registry.engines());
        registry
    })
}

/// The process-wide registry, if [`register_drivers`] has run
pub fn drivers() -> Option<&'static DriverRegistry> {
    DRIVERS.get()
}

/// Connect through the process-wide registry, dispatching on `config.engine()`
pub fn connect(config: &ConnectionConfig, timeout: Duration) -> Result<ConnectionHandle> {
    let registry = drivers().ok_or_else(|| {
        Error::open(
            config.engine(),
            "no drivers registered (call register_drivers() at startup)",
        )
    })?;
    registry.connect(config, timeout)
}

/// Connectors keyed by the engine they speak
#[derive(Default)]
pub struct DriverRegistry {
    connectors: BTreeMap<EngineKind, Box<dyn Connector>>,
}

impl DriverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in connector
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(MySqlConnector));
        registry.register(Box::new(PostgresConnector));
        registry
    }

    /// Add a connector, replacing any previous one for the same engine
    pub fn register(&mut self, connector: Box<dyn Connector>) {
        self.connectors.insert(connector.engine(), connector);
    }

    /// Engines with a registered connector
    pub fn engines(&self) -> Vec<EngineKind> {
        self.connectors.keys().copied().collect()
    }

    /// Connector for `engine`
    pub fn get(&self, engine: EngineKind) -> Result<&dyn Connector> {
        self.connectors
            .get(&engine)
            .map(|connector| &**connector)
            .ok_or_else(|| Error::open(engine, "no driver registered for this engine"))
    }

    /// Connect with the connector matching `config.engine()`
    pub fn connect(&self, config: &ConnectionConfig, timeout: Duration) -> Result<ConnectionHandle> {
        self.get(config.engine())?.connect(config, timeout)
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("engines", &self.engines())
            .finish()
    }
}
