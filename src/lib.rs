//! # influxdb-http
//!
//! Async client for the InfluxDB 0.8 HTTP/JSON API.
//!
//! A [`Client`] holds the connection settings and hands out lightweight
//! [`Database`] handles. Every handle reads the client's settings through one
//! shared record, so changing the time precision on the client applies to
//! handles created before the change as well as after it.
//!
//! ## Quick Start
//!
//! ```ignore
//! use influxdb_http::{Client, Config, Point, Precision};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(Config::default().with_credentials("root", "root"))?;
//!     let db = client.create_database("karma").await?;
//!
//!     db.insert_points("foobar", &[
//!         Point::new().field("type", "/foobar").field("karma", 10),
//!         Point::new().field("type", "/foobar").field("karma", 20),
//!         Point::new().field("type", "/barfoo").field("karma", 30),
//!     ]).await?;
//!
//!     client.set_time_precision(Precision::Milliseconds);
//!     for row in db.query("SELECT mean(karma) FROM foobar GROUP BY type").await? {
//!         let row = row?;
//!         println!(
//!             "{} at {:?}: {:?}",
//!             row.get_string("type").unwrap_or_default(),
//!             row.time(),
//!             row.get_number("mean")
//!         );
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Live precision**: one shared configuration, no handle registry
//! - **Typed rows**: grouped series are flattened into [`Row`]s carrying their
//!   tag values, with timestamps in the client's precision at parse time
//! - **Error handling**: every failure is a [`Result`], no panics
//! - **Async native**: built on reqwest; rows are also available as a
//!   `futures::Stream`

pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod http;
pub mod parser;
pub mod types;
pub mod value;

// Re-export main types at crate root
pub use client::Client;
pub use config::{Config, ConnectionConfig, Protocol};
pub use database::Database;
pub use error::{Error, Result};
pub use http::RawResponse;
pub use parser::Rows;
pub use types::{Point, Precision, Row, Series};
pub use value::Value;
