//! MySQL connector
//!
//! Descriptors use the `user:password@tcp(host:port)/database` DSN grammar,
//! optionally followed by `?tls=true`. The driver cannot fall back to
//! plaintext after asking for TLS, so [`SslMode::Prefer`] is rejected.

use super::connector::{ConnectionHandle, Connector, Session};
use crate::config::ConnectionConfig;
use crate::error::{Error, Result};
use crate::types::{EngineKind, SslMode};
use mysql::{Conn, OptsBuilder, SslOpts};
use std::time::Duration;

const PREFER_UNSUPPORTED: &str =
    "mysql driver cannot negotiate opportunistic TLS; use require or disable";

/// Connector for MySQL and MariaDB servers
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

impl Connector for MySqlConnector {
    fn engine(&self) -> EngineKind {
        EngineKind::MySql
    }

    fn build_descriptor(&self, config: &ConnectionConfig, password: &str) -> Result<String> {
        config.validate()?;

        if config.user().contains(':') {
            return Err(Error::descriptor("user", "must not contain ':'"));
        }
        if config.host().contains(['(', ')']) {
            return Err(Error::descriptor("host", "must not contain parentheses"));
        }
        if config.database().contains(['/', '?']) {
            return Err(Error::descriptor("database", "must not contain '/' or '?'"));
        }
        if config.ssl_mode() == SslMode::Prefer {
            return Err(Error::descriptor("ssl_mode", PREFER_UNSUPPORTED));
        }

        let mut dsn = format!(
            "{}:{}@tcp({}:{})/{}",
            config.user(),
            password,
            bracket_ipv6(config.host()),
            config.port(),
            config.database()
        );
        match config.ssl_mode() {
            SslMode::Disable | SslMode::Prefer => {}
            SslMode::Require => dsn.push_str("?tls=true"),
        }
        Ok(dsn)
    }

    fn open(&self, descriptor: &str, timeout: Duration) -> Result<Session> {
        let dsn = Dsn::parse(descriptor)?;

        let mut opts = OptsBuilder::new()
            .ip_or_hostname(Some(dsn.host))
            .tcp_port(dsn.port)
            .user(Some(dsn.user))
            .pass(Some(dsn.password))
            .db_name(Some(dsn.database))
            .prefer_socket(false)
            .tcp_connect_timeout(Some(timeout))
            .read_timeout(Some(timeout))
            .write_timeout(Some(timeout));

        if dsn.tls != SslMode::Disable {
            opts = opts.ssl_opts(Some(SslOpts::default()));
        }

        let conn =
            Conn::new(opts).map_err(|e| Error::unreachable(EngineKind::MySql, e.to_string()))?;
        Ok(Session::mysql(conn))
    }
}

/// Open a verified MySQL connection
pub fn connect_mysql(config: &ConnectionConfig, timeout: Duration) -> Result<ConnectionHandle> {
    MySqlConnector.connect(config, timeout)
}

fn bracket_ipv6(host: &str) -> String {
    if host.contains(':') {
        format!("[{host}]")
    } else {
        host.to_string()
    }
}

// ============================================================================
// DSN Parsing
// ============================================================================

/// Fields recovered from a MySQL DSN
#[derive(Debug, Clone, PartialEq, Eq)]
struct Dsn {
    user: String,
    password: String,
    host: String,
    port: u16,
    database: String,
    tls: SslMode,
}

impl Dsn {
    /// Parse `user[:password]@tcp(host:port)/database[?params]`
    ///
    /// The database is everything after the last `/`, so the password may
    /// contain `/` and `@`.
    fn parse(descriptor: &str) -> Result<Self> {
        let (prefix, rest) = descriptor
            .rsplit_once('/')
            .ok_or_else(|| invalid("missing '/database'"))?;
        let (database, params) = match rest.split_once('?') {
            Some((db, params)) => (db, Some(params)),
            None => (rest, None),
        };

        let (userinfo, net) = prefix
            .rsplit_once('@')
            .ok_or_else(|| invalid("missing 'user@' section"))?;
        let (user, password) = userinfo.split_once(':').unwrap_or((userinfo, ""));

        let address = net
            .strip_prefix("tcp(")
            .and_then(|a| a.strip_suffix(')'))
            .ok_or_else(|| invalid("only tcp(host:port) addresses are supported"))?;
        let (host, port) = split_address(address)?;

        let mut tls = SslMode::Disable;
        for pair in params.into_iter().flat_map(|p| p.split('&')) {
            match pair.split_once('=') {
                Some(("tls", value)) => {
                    tls = value
                        .parse()
                        .map_err(|_| invalid(format!("unsupported tls value '{value}'")))?;
                    if tls == SslMode::Prefer {
                        return Err(invalid(PREFER_UNSUPPORTED));
                    }
                }
                _ => return Err(invalid(format!("unsupported parameter '{pair}'"))),
            }
        }

        Ok(Self {
            user: user.to_string(),
            password: password.to_string(),
            host: host.to_string(),
            port,
            database: database.to_string(),
            tls,
        })
    }
}

fn split_address(address: &str) -> Result<(&str, u16)> {
    let (host, port) = if let Some(bracketed) = address.strip_prefix('[') {
        let (host, tail) = bracketed
            .split_once(']')
            .ok_or_else(|| invalid("unterminated IPv6 address"))?;
        let port = tail
            .strip_prefix(':')
            .ok_or_else(|| invalid("missing port"))?;
        (host, port)
    } else {
        address
            .rsplit_once(':')
            .ok_or_else(|| invalid("missing port"))?
    };

    if host.is_empty() {
        return Err(invalid("missing host"));
    }
    let port = port
        .parse::<u16>()
        .map_err(|_| invalid(format!("invalid port '{port}'")))?;
    Ok((host, port))
}

fn invalid(message: impl Into<String>) -> Error {
    Error::open(
        EngineKind::MySql,
        format!("malformed DSN: {}", message.into()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn config() -> ConnectionConfig {
        ConnectionConfig::new(EngineKind::MySql, "localhost", 3306, "root", "x", "app")
    }

    #[test]
    fn test_descriptor() {
        let dsn = MySqlConnector.descriptor(&config()).unwrap();
        assert_eq!(dsn, "root:x@tcp(localhost:3306)/app");
    }

    #[test]
    fn test_descriptor_is_deterministic() {
        let first = MySqlConnector.descriptor(&config()).unwrap();
        let second = MySqlConnector.descriptor(&config()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_masked_descriptor() {
        let dsn = MySqlConnector.masked_descriptor(&config()).unwrap();
        assert_eq!(dsn, "root:****@tcp(localhost:3306)/app");
    }

    #[test]
    fn test_descriptor_tls_required() {
        let dsn = MySqlConnector
            .descriptor(&config().with_ssl_mode(SslMode::Require))
            .unwrap();
        assert_eq!(dsn, "root:x@tcp(localhost:3306)/app?tls=true");
    }

    #[test]
    fn test_descriptor_rejects_prefer() {
        let config = config().with_ssl_mode(SslMode::Prefer);
        match MySqlConnector.descriptor(&config) {
            Err(Error::DescriptorConstruction { field, message }) => {
                assert_eq!(field, "ssl_mode");
                assert!(message.contains("require or disable"));
            }
            other => panic!("expected descriptor error, got {other:?}"),
        }
    }

    #[test]
    fn test_connect_with_prefer_fails_before_network() {
        let config = config().with_ssl_mode(SslMode::Prefer);
        let err = connect_mysql(&config, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::DescriptorConstruction { ref field, .. } if field == "ssl_mode"));
    }

    #[test]
    fn test_descriptor_ipv6() {
        let config = ConnectionConfig::new(EngineKind::MySql, "::1", 3306, "root", "", "app");
        let dsn = MySqlConnector.descriptor(&config).unwrap();
        assert_eq!(dsn, "root:@tcp([::1]:3306)/app");
    }

    #[test_case("ro:ot", "localhost", "app", "user"; "colon in user")]
    #[test_case("root", "local(host)", "app", "host"; "parentheses in host")]
    #[test_case("root", "localhost", "a/pp", "database"; "slash in database")]
    #[test_case("root", "localhost", "", "database"; "empty database")]
    fn test_descriptor_rejects(user: &str, host: &str, database: &str, field: &str) {
        let config = ConnectionConfig::new(EngineKind::MySql, host, 3306, user, "x", database);
        match MySqlConnector.descriptor(&config) {
            Err(Error::DescriptorConstruction { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected descriptor error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_round_trips_tricky_password() {
        let config = ConnectionConfig::new(
            EngineKind::MySql,
            "db.internal",
            3307,
            "backup",
            "p@ss:w/rd",
            "shop",
        )
        .with_ssl_mode(SslMode::Require);
        let descriptor = MySqlConnector.descriptor(&config).unwrap();

        let dsn = Dsn::parse(&descriptor).unwrap();
        assert_eq!(
            dsn,
            Dsn {
                user: "backup".to_string(),
                password: "p@ss:w/rd".to_string(),
                host: "db.internal".to_string(),
                port: 3307,
                database: "shop".to_string(),
                tls: SslMode::Require,
            }
        );
    }

    #[test]
    fn test_parse_ipv6() {
        let dsn = Dsn::parse("root:x@tcp([fe80::1]:3306)/app").unwrap();
        assert_eq!(dsn.host, "fe80::1");
        assert_eq!(dsn.port, 3306);
    }

    #[test_case("root:x@tcp(localhost:3306)"; "missing database")]
    #[test_case("root:x@unix(/tmp/mysql.sock)/app"; "unix socket")]
    #[test_case("root:x@tcp(localhost)/app"; "missing port")]
    #[test_case("root:x@tcp(localhost:99999)/app"; "port out of range")]
    #[test_case("root:x@tcp(:3306)/app"; "missing host")]
    #[test_case("root:x@tcp(localhost:3306)/app?charset=utf8"; "unknown parameter")]
    #[test_case("root:x@tcp(localhost:3306)/app?tls=preferred"; "opportunistic tls")]
    #[test_case("tcp(localhost:3306)/app"; "missing user")]
    fn test_open_rejects_malformed_descriptor(descriptor: &str) {
        let err = MySqlConnector
            .open(descriptor, Duration::from_secs(1))
            .unwrap_err();
        assert!(
            matches!(
                err,
                Error::OpenFailure {
                    engine: EngineKind::MySql,
                    ..
                }
            ),
            "unexpected error: {err:?}"
        );
    }

    #[test]
    fn test_connect_rejects_postgres_config() {
        let config = ConnectionConfig::new(EngineKind::Postgres, "localhost", 5432, "pg", "x", "app");
        let err = connect_mysql(&config, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::DescriptorConstruction { ref field, .. } if field == "engine"));
    }
}
