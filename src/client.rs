//! Root client.
//!
//! This module provides the `Client` type: database lifecycle calls and the
//! one place the time precision is set.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConnectionConfig};
use crate::database::Database;
use crate::error::Result;
use crate::http::Transport;
use crate::types::Precision;

/// Client for an InfluxDB 0.8 server.
///
/// Cloning is cheap; clones share the same configuration, so a precision set
/// on one is seen by all of them and by every [`Database`] they hand out.
///
/// # Example
///
/// ```ignore
/// use influxdb_http::{Client, Config, Precision, Value};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new(Config::default())?;
///     let db = client.create_database("metrics").await?;
///
///     db.insert("requests", [("path", Value::from("/login")), ("latency", Value::from(12))]).await?;
///
///     client.set_time_precision(Precision::Milliseconds);
///     for row in db.query("SELECT * FROM requests").await? {
///         let row = row?;
///         println!("{:?} {:?}", row.time(), row.get("latency"));
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    transport: Arc<Transport>,
}

#[derive(Debug, Serialize)]
struct CreateDatabase<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct DatabaseEntry {
    name: String,
}

impl Client {
    /// Create a new client.
    ///
    /// Fails with `InvalidArgument` if host, port and base path do not form
    /// a valid URL. No request is made.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_http_client(reqwest::Client::new(), config)
    }

    /// Create a new client with a custom reqwest client.
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_http_client(http: reqwest::Client, config: Config) -> Result<Self> {
        let shared = Arc::new(ConnectionConfig::new(config));
        let transport = Transport::new(http, shared)?;
        Ok(Self {
            transport: Arc::new(transport),
        })
    }

    /// Shared connection settings.
    pub fn config(&self) -> &ConnectionConfig {
        self.transport.config()
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Current time precision.
    pub fn time_precision(&self) -> Precision {
        self.config().time_precision()
    }

    /// Set the time precision for this client and every handle it produced.
    pub fn set_time_precision(&self, precision: Precision) {
        tracing::debug!(%precision, "time precision changed");
        self.config().set_time_precision(precision);
    }

    /// Set the time precision from its symbol (`s`, `m` or `u`).
    ///
    /// Anything else fails with `InvalidArgument` and leaves the current
    /// precision untouched.
    pub fn set_time_precision_str(&self, precision: &str) -> Result<()> {
        let precision = precision.parse()?;
        self.set_time_precision(precision);
        Ok(())
    }

    /// Create a database and return a handle to it.
    ///
    /// The server decides whether a duplicate name is an error.
    pub async fn create_database(&self, name: impl Into<String>) -> Result<Database> {
        let name = name.into();
        self.transport
            .post(&["db"], &CreateDatabase { name: &name }, &[])
            .await?;
        Ok(Database::new(self.clone(), name))
    }

    /// Delete a database.
    ///
    /// Deleting a database that does not exist fails with `RequestFailed`.
    pub async fn delete_database(&self, name: &str) -> Result<()> {
        self.transport.delete(&["db", name]).await?;
        Ok(())
    }

    /// Handles for every database on the server, in server order.
    pub async fn get_databases(&self) -> Result<Vec<Database>> {
        Ok(self
            .database_names()
            .await?
            .into_iter()
            .map(|name| Database::new(self.clone(), name))
            .collect())
    }

    /// Names of every database on the server, in server order.
    pub async fn database_names(&self) -> Result<Vec<String>> {
        let response = self.transport.get(&["db"], &[]).await?;
        let entries: Vec<DatabaseEntry> = response.json()?;
        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    /// Handle for a database by name.
    ///
    /// The database is not checked for existence until the handle is used.
    pub fn database(&self, name: impl Into<String>) -> Database {
        Database::new(self.clone(), name.into())
    }

    /// Alias of [`Client::database`].
    pub fn get_database(&self, name: impl Into<String>) -> Database {
        self.database(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn client() -> Client {
        Client::new(Config::default()).unwrap()
    }

    #[test]
    fn test_default_precision_is_seconds() {
        let client = client();
        assert_eq!(client.time_precision(), Precision::Seconds);
        assert_eq!(client.database("x").time_precision(), Precision::Seconds);
    }

    #[test]
    fn test_initial_precision_from_config() {
        let client =
            Client::new(Config::default().with_time_precision(Precision::Microseconds)).unwrap();
        assert_eq!(client.database("x").time_precision(), Precision::Microseconds);
    }

    #[test]
    fn test_precision_propagates_to_existing_and_new_handles() {
        let client = client();
        let before = client.database("before");

        for p in [
            Precision::Milliseconds,
            Precision::Microseconds,
            Precision::Seconds,
        ] {
            client.set_time_precision(p);
            let after = client.get_database("after");

            assert_eq!(client.time_precision(), p);
            assert_eq!(before.time_precision(), p);
            assert_eq!(after.time_precision(), p);
        }
    }

    #[test]
    fn test_precision_shared_between_clones() {
        let client = client();
        let clone = client.clone();
        let handle = clone.database("x");

        client.set_time_precision(Precision::Milliseconds);
        assert_eq!(clone.time_precision(), Precision::Milliseconds);
        assert_eq!(handle.time_precision(), Precision::Milliseconds);
    }

    #[test]
    fn test_precision_str() {
        let client = client();
        let handle = client.database("x");

        client.set_time_precision_str("u").unwrap();
        assert_eq!(handle.time_precision(), Precision::Microseconds);
    }

    #[test]
    fn test_invalid_precision_leaves_state_unchanged() {
        let client = client();
        let handle = client.database("x");
        client.set_time_precision(Precision::Milliseconds);

        for bad in ["", "x", "ns", "M", "ms", "us", "seconds"] {
            let result = client.set_time_precision_str(bad);
            assert!(matches!(result, Err(Error::InvalidArgument(_))));
            assert_eq!(client.time_precision(), Precision::Milliseconds);
            assert_eq!(handle.time_precision(), Precision::Milliseconds);
        }
    }

    #[test]
    fn test_handles_do_not_outlive_callers() {
        let client = client();
        let handle = client.database("temporary");
        assert_eq!(Arc::strong_count(&client.transport), 2);

        drop(handle);
        assert_eq!(Arc::strong_count(&client.transport), 1);
    }

    #[test]
    fn test_invalid_address() {
        let result = Client::new(Config::default().with_host("not a host"));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
