//! Database connection layer
//!
//! Turns a [`ConnectionConfig`](crate::config::ConnectionConfig) into a live,
//! verified [`ConnectionHandle`] for MySQL or PostgreSQL. Each engine has its
//! own connector sharing the build descriptor, open, ping template from
//! [`Connector`].

mod connector;
mod mysql;
mod postgres;
mod registry;

pub use connector::{ConnectionHandle, Connector, Session, MASKED_PASSWORD};
pub use self::mysql::{connect_mysql, MySqlConnector};
pub use self::postgres::{connect_postgres, PostgresConnector};
pub use registry::{connect, drivers, register_drivers, DriverRegistry};
