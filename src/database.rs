//! Per-database handle: users, writes and queries.

use std::pin::Pin;

use async_stream::stream;
use futures::Stream;
use serde::Serialize;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::parser::Rows;
use crate::types::{Point, Precision, Row, TIME_COLUMN};
use crate::value::Value;

/// Handle for one named database.
///
/// Handles are cheap and hold no connection of their own. They read the
/// owning client's time precision every time they build a request or parse
/// a response, so a precision change on the client applies to handles that
/// already exist. Rows already returned by [`Database::query`] keep the
/// precision that was current when the response was parsed.
#[derive(Clone, Debug)]
pub struct Database {
    name: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct CreateUser<'a> {
    name: &'a str,
    password: &'a str,
}

/// One entry of a write payload. `columns` and each element of `points` are
/// parallel.
#[derive(Debug, Serialize)]
struct WriteSeries<'a> {
    name: &'a str,
    columns: Vec<String>,
    points: Vec<Vec<Value>>,
}

impl Database {
    pub(crate) fn new(client: Client, name: String) -> Self {
        Self { name, client }
    }

    /// Database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The client this handle was created from.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The owning client's current time precision.
    pub fn time_precision(&self) -> Precision {
        self.client.time_precision()
    }

    /// Delete this database on the server.
    ///
    /// The handle stays usable; later calls get the server's error.
    pub async fn drop_database(&self) -> Result<()> {
        self.client.delete_database(&self.name).await
    }

    /// Create a database user.
    pub async fn create_user(&self, username: &str, password: &str) -> Result<()> {
        let body = CreateUser {
            name: username,
            password,
        };
        self.client
            .transport()
            .post(&["db", &self.name, "users"], &body, &[])
            .await?;
        Ok(())
    }

    /// Write a single point built from `(column, value)` pairs.
    ///
    /// # Example
    ///
    /// ```ignore
    /// db.insert("foobar", [("type", Value::from("/foobar")), ("karma", Value::from(10))]).await?;
    /// ```
    pub async fn insert<I, K, V>(&self, series: &str, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let point: Point = fields.into_iter().collect();
        self.insert_points(series, &[point]).await
    }

    /// Write several points to one series in a single request.
    ///
    /// Explicit timestamps are read in the client's current precision.
    pub async fn insert_points(&self, series: &str, points: &[Point]) -> Result<()> {
        let payload = write_payload(series, points)?;
        let precision = self.time_precision();
        self.client
            .transport()
            .post(
                &["db", &self.name, "series"],
                &payload,
                &[("time_precision", precision.code())],
            )
            .await?;
        Ok(())
    }

    /// Run a query and return its rows.
    ///
    /// The full response is read before this returns. Every row carries the
    /// client's precision as of the moment the response is parsed; changing
    /// it afterwards does not affect rows still being iterated.
    pub async fn query(&self, query: &str) -> Result<Rows> {
        let wire = self.time_precision();
        let response = self
            .client
            .transport()
            .get(
                &["db", &self.name, "series"],
                &[("q", query), ("time_precision", wire.code())],
            )
            .await?;
        Rows::converted(&response.body, wire, self.time_precision())
    }

    /// Run a query and return its rows as an async stream.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use futures::StreamExt;
    ///
    /// let mut stream = db.query_stream("SELECT * FROM foobar").await?;
    /// while let Some(row) = stream.next().await {
    ///     println!("{:?}", row?);
    /// }
    /// ```
    pub async fn query_stream(
        &self,
        query: &str,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<Row>> + Send>>> {
        let mut rows = self.query(query).await?;

        let s = stream! {
            loop {
                match rows.next() {
                    Some(Ok(row)) => yield Ok(row),
                    Some(Err(e)) => {
                        yield Err(e);
                        break;
                    }
                    None => break,
                }
            }
        };

        Ok(Box::pin(s))
    }

    /// First row of a query.
    ///
    /// An empty result fails with `NotFound`.
    pub async fn first(&self, query: &str) -> Result<Row> {
        match self.query(query).await?.next() {
            Some(row) => row,
            None => Err(Error::NotFound(format!("query returned no rows: {}", query))),
        }
    }
}

/// Pack points into wire series, merging runs of points with identical
/// columns.
fn write_payload<'a>(series: &'a str, points: &[Point]) -> Result<Vec<WriteSeries<'a>>> {
    if points.is_empty() {
        return Err(Error::InvalidArgument(format!(
            "no points to write to series '{}'",
            series
        )));
    }

    let mut payload: Vec<WriteSeries<'a>> = Vec::new();
    for point in points {
        let columns = point.columns();
        if columns.iter().all(|c| c == TIME_COLUMN) {
            return Err(Error::InvalidArgument(format!(
                "point for series '{}' has no fields",
                series
            )));
        }
        let values = point.values();

        match payload.last_mut() {
            Some(last) if last.columns == columns => last.points.push(values),
            _ => payload.push(WriteSeries {
                name: series,
                columns,
                points: vec![values],
            }),
        }
    }
    Ok(payload)
}
