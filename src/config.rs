//! Connection settings and the shared, live configuration record.
//!
//! [`Config`] is what callers fill in. A [`Client`](crate::Client) turns it
//! into a [`ConnectionConfig`] held behind an `Arc`, which every database
//! handle created from that client reads through. The time precision is the
//! only mutable field, so a precision change on the client is seen by every
//! handle at once, including handles created before the change.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::Deserialize;

use crate::types::Precision;

/// Transport protocol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// Plain HTTP.
    #[default]
    Http,
    /// HTTP over TLS.
    Https,
}

impl Protocol {
    /// URL scheme.
    pub fn scheme(self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

/// Settings for connecting to a server.
///
/// # Example
///
/// ```
/// use influxdb_http::{Config, Precision, Protocol};
///
/// let config = Config::default()
///     .with_host("influx.internal")
///     .with_credentials("admin", "secret")
///     .with_protocol(Protocol::Https)
///     .with_time_precision(Precision::Milliseconds);
/// assert_eq!(config.port, 8086);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Basic auth user.
    pub user: String,
    /// Basic auth password.
    pub pass: String,
    /// `http` or `https`.
    pub protocol: Protocol,
    /// Path prefix in front of every API path, e.g. `influx` behind a proxy.
    pub base_path: String,
    /// Initial time precision.
    pub time_precision: Precision,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8086,
            user: "root".to_string(),
            pass: "root".to_string(),
            protocol: Protocol::Http,
            base_path: String::new(),
            time_precision: Precision::Seconds,
        }
    }
}

impl Config {
    /// Set the server host name.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the server port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the basic-auth user and password.
    pub fn with_credentials(mut self, user: impl Into<String>, pass: impl Into<String>) -> Self {
        self.user = user.into();
        self.pass = pass.into();
        self
    }

    /// Set the URL scheme.
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set a path prefix placed before every endpoint.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    /// Set the initial time precision.
    pub fn with_time_precision(mut self, precision: Precision) -> Self {
        self.time_precision = precision;
        self
    }
}

/// The authoritative configuration shared by a client and its handles.
pub struct ConnectionConfig {
    host: String,
    port: u16,
    user: String,
    pass: String,
    protocol: Protocol,
    base_path: String,
    time_precision: AtomicU8,
}

impl ConnectionConfig {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            host: config.host,
            port: config.port,
            user: config.user,
            pass: config.pass,
            protocol: config.protocol,
            base_path: config.base_path,
            time_precision: AtomicU8::new(encode(config.time_precision)),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub(crate) fn pass(&self) -> &str {
        &self.pass
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Current time precision.
    pub fn time_precision(&self) -> Precision {
        decode(self.time_precision.load(Ordering::Acquire))
    }

    pub(crate) fn set_time_precision(&self, precision: Precision) {
        self.time_precision.store(encode(precision), Ordering::Release);
    }

    /// Snapshot of the current settings, password included.
    pub fn to_config(&self) -> Config {
        Config {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            pass: self.pass.clone(),
            protocol: self.protocol,
            base_path: self.base_path.clone(),
            time_precision: self.time_precision(),
        }
    }
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("protocol", &self.protocol)
            .field("base_path", &self.base_path)
            .field("time_precision", &self.time_precision())
            .finish_non_exhaustive()
    }
}

fn encode(precision: Precision) -> u8 {
    match precision {
        Precision::Seconds => 0,
        Precision::Milliseconds => 1,
        Precision::Microseconds => 2,
    }
}

fn decode(raw: u8) -> Precision {
    match raw {
        1 => Precision::Milliseconds,
        2 => Precision::Microseconds,
        _ => Precision::Seconds,
    }
}
