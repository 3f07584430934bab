//! Parser for series-shaped JSON query responses.
//!
//! The server answers a query with an array of series, each carrying its own
//! column list and a list of points. [`Rows`] flattens that into one
//! sequence of [`Row`]s, series by series, converting the `time` column into
//! one target precision fixed when the response is parsed.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::types::{Precision, Row, Series, TIME_COLUMN};
use crate::value::Value;

/// Series currently being drained.
struct Current {
    name: String,
    columns: Vec<String>,
    time_index: Option<usize>,
    tags: Vec<(String, Value)>,
    points: std::vec::IntoIter<Vec<serde_json::Value>>,
}

impl Current {
    fn new(series: Series) -> Result<Self> {
        let time_index = series.columns.iter().position(|c| c == TIME_COLUMN);
        let tags = series
            .tags
            .into_iter()
            .map(|(k, v)| Ok((k, Value::from_json(v)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: series.name,
            columns: series.columns,
            time_index,
            tags,
            points: series.points.into_iter(),
        })
    }
}

/// Forward-only sequence of rows from one query response.
///
/// The whole body has been read and its shape checked before this is
/// handed out; rows are built lazily. After the first error the iterator
/// yields nothing more.
///
/// # Example
///
/// ```
/// use influxdb_http::{Precision, Rows};
///
/// let body = r#"[{"name":"foobar","columns":["time","karma"],"points":[[1700000000,10]]}]"#;
/// let rows: Vec<_> = Rows::parse(body, Precision::Seconds)
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
/// assert_eq!(rows[0].get_long("karma"), Some(10));
/// ```
pub struct Rows {
    series: std::vec::IntoIter<Series>,
    current: Option<Current>,
    wire: Precision,
    target: Precision,
    done: bool,
}

impl Rows {
    /// Parse a response body whose timestamps are in `precision`.
    ///
    /// Rows keep that precision.
    pub fn parse(body: &str, precision: Precision) -> Result<Self> {
        Self::converted(body, precision, precision)
    }

    /// Parse a body whose timestamps are in `wire`, converting every row to
    /// `target`.
    pub fn converted(body: &str, wire: Precision, target: Precision) -> Result<Self> {
        let series: Vec<Series> = serde_json::from_str(body)
            .map_err(|e| Error::MalformedResponse(format!("invalid series payload: {}", e)))?;
        Ok(Self {
            series: series.into_iter(),
            current: None,
            wire,
            target,
            done: false,
        })
    }

    fn next_row(&mut self) -> Result<Option<Row>> {
        loop {
            if let Some(current) = &mut self.current {
                if let Some(point) = current.points.next() {
                    return build_row(current, point, self.wire, self.target).map(Some);
                }
                self.current = None;
            }

            match self.series.next() {
                Some(series) => self.current = Some(Current::new(series)?),
                None => return Ok(None),
            }
        }
    }
}

impl Iterator for Rows {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Rows {}

fn build_row(
    series: &Current,
    point: Vec<serde_json::Value>,
    wire: Precision,
    precision: Precision,
) -> Result<Row> {
    if point.len() != series.columns.len() {
        return Err(Error::MalformedResponse(format!(
            "series '{}': point has {} values for {} columns",
            series.name,
            point.len(),
            series.columns.len()
        )));
    }

    let mut time = None;
    let mut values = BTreeMap::new();
    for (i, raw) in point.into_iter().enumerate() {
        if Some(i) == series.time_index {
            time = Some(parse_time(raw, &series.name, wire, precision)?);
        } else {
            values.insert(series.columns[i].clone(), Value::from_json(raw)?);
        }
    }
    for (tag, value) in &series.tags {
        values
            .entry(tag.clone())
            .or_insert_with(|| value.clone());
    }

    Ok(Row {
        series: series.name.clone(),
        time,
        precision,
        values,
    })
}

fn parse_time(raw: serde_json::Value, series: &str, wire: Precision, target: Precision) -> Result<i64> {
    let timestamp = raw.as_i64().ok_or_else(|| {
        Error::MalformedResponse(format!(
            "series '{}': time must be an integer, got {}",
            series, raw
        ))
    })?;
    wire.convert(timestamp, target).ok_or_else(|| {
        Error::MalformedResponse(format!(
            "series '{}': time {} out of range for precision {}",
            series, timestamp, target
        ))
    })
}
