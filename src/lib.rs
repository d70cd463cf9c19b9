//! # pralaya-db
//!
//! Connection layer of a MySQL/PostgreSQL backup and restore tool.
//!
//! A [`ConnectionConfig`] names an engine, a target and credentials. The
//! engine's [`Connector`](database::Connector) turns it into a descriptor,
//! opens a session and pings it; only a session that answered is returned,
//! as a [`ConnectionHandle`](database::ConnectionHandle).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pralaya_db::database::{connect_postgres, register_drivers};
//! use pralaya_db::{ConnectionConfig, EngineKind, Result};
//! use std::time::Duration;
//!
//! fn main() -> Result<()> {
//!     register_drivers();
//!
//!     let config =
//!         ConnectionConfig::new(EngineKind::Postgres, "localhost", 5432, "postgres", "x", "app");
//!     let handle = connect_postgres(&config, Duration::from_secs(5))?;
//!     println!("connected to {}", handle.target());
//!     handle.close()
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Engine and TLS selectors
pub mod types;

/// Connection configuration loading
pub mod config;

/// Connectors, driver registry and connection handles
pub mod database;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ConnectionConfig;
pub use error::{Error, Result};
pub use types::{EngineKind, SslMode};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
