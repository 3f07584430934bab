//! Core types shared by the write and query paths.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Error;
use crate::value::Value;

/// Name of the timestamp column on the wire.
pub const TIME_COLUMN: &str = "time";

/// Unit in which timestamps are written and read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Precision {
    /// Seconds (`s`).
    #[default]
    Seconds,
    /// Milliseconds (`m`).
    Milliseconds,
    /// Microseconds (`u`).
    Microseconds,
}

impl Precision {
    /// Code sent as the `time_precision` query parameter.
    pub fn code(self) -> &'static str {
        match self {
            Precision::Seconds => "s",
            Precision::Milliseconds => "m",
            Precision::Microseconds => "u",
        }
    }

    /// Number of units in one second.
    pub fn units_per_second(self) -> i64 {
        match self {
            Precision::Seconds => 1,
            Precision::Milliseconds => 1_000,
            Precision::Microseconds => 1_000_000,
        }
    }

    /// Rescale a timestamp from this precision into `target`.
    ///
    /// Coarsening floors toward negative infinity. Returns `None` when
    /// refining overflows `i64`.
    pub fn convert(self, timestamp: i64, target: Precision) -> Option<i64> {
        let from = self.units_per_second();
        let to = target.units_per_second();
        if to >= from {
            timestamp.checked_mul(to / from)
        } else {
            Some(timestamp.div_euclid(from / to))
        }
    }
}

impl FromStr for Precision {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "s" => Ok(Self::Seconds),
            "m" => Ok(Self::Milliseconds),
            "u" => Ok(Self::Microseconds),
            _ => Err(Error::InvalidArgument(format!(
                "expecting s, m or u as time precision, got {:?}",
                input
            ))),
        }
    }
}

impl TryFrom<String> for Precision {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One series of a query response, as sent by the server.
///
/// A `GROUP BY` query returns one of these per distinct tag value.
#[derive(Clone, Debug, Deserialize)]
pub struct Series {
    /// Series name.
    pub name: String,
    /// Group-by key to value, when the server reports it separately.
    #[serde(default)]
    pub tags: BTreeMap<String, serde_json::Value>,
    /// Column names, parallel to each point.
    pub columns: Vec<String>,
    /// Rows of values.
    pub points: Vec<Vec<serde_json::Value>>,
}

/// A point to write: ordered fields plus an optional explicit timestamp.
///
/// Field order is kept and becomes the column order on the wire.
///
/// # Example
///
/// ```
/// use influxdb_http::Point;
///
/// let point = Point::new().field("type", "/foobar").field("karma", 10);
/// assert_eq!(point.fields().len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Point {
    time: Option<i64>,
    fields: Vec<(String, Value)>,
}

impl Point {
    /// Create an empty point. The server assigns the timestamp.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit timestamp, in the client's current precision.
    ///
    /// Takes precedence over a field named `time`.
    pub fn at(mut self, time: i64) -> Self {
        self.time = Some(time);
        self
    }

    /// Add a field, or replace the value of an existing one in place.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name.into(), value.into());
        self
    }

    fn set(&mut self, name: String, value: Value) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Explicit timestamp, if any.
    pub fn time(&self) -> Option<i64> {
        self.time
    }

    /// Column names as they go on the wire.
    pub(crate) fn columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.fields.len() + 1);
        if self.time.is_some() {
            columns.push(TIME_COLUMN.to_string());
        }
        columns.extend(
            self.written_fields()
                .map(|(name, _)| name.clone()),
        );
        columns
    }

    /// Values in the same order as [`Point::columns`].
    pub(crate) fn values(&self) -> Vec<Value> {
        let mut values = Vec::with_capacity(self.fields.len() + 1);
        if let Some(time) = self.time {
            values.push(Value::Long(time));
        }
        values.extend(self.written_fields().map(|(_, value)| value.clone()));
        values
    }

    fn written_fields(&self) -> impl Iterator<Item = &(String, Value)> {
        let explicit_time = self.time.is_some();
        self.fields
            .iter()
            .filter(move |(name, _)| !(explicit_time && name == TIME_COLUMN))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Point {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut point = Point::new();
        for (name, value) in iter {
            point.set(name.into(), value.into());
        }
        point
    }
}

/// A single row from a query result.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    /// Name of the series this row came from.
    pub series: String,
    /// Timestamp in [`Row::precision`], if the series has a `time` column.
    pub time: Option<i64>,
    /// Precision `time` is expressed in.
    pub precision: Precision,
    /// Column name to value mapping, `time` excluded, tags included.
    pub values: BTreeMap<String, Value>,
}

impl Row {
    /// Get a value by column name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Get value as string.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.values.get(name).and_then(|v| v.string())
    }

    /// Get value as f64.
    pub fn get_double(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(|v| v.as_double())
    }

    /// Get any numeric value widened to f64.
    pub fn get_number(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(|v| v.as_number())
    }

    /// Get value as i64.
    pub fn get_long(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(|v| v.as_long())
    }

    /// Get value as bool.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(|v| v.as_bool())
    }

    /// Get the timestamp in the row's precision.
    pub fn time(&self) -> Option<i64> {
        self.time
    }

    /// Get the timestamp as a UTC date-time.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        let time = self.time?;
        let per_second = self.precision.units_per_second();
        let secs = time.div_euclid(per_second);
        let nanos = time.rem_euclid(per_second) * (1_000_000_000 / per_second);
        DateTime::from_timestamp(secs, u32::try_from(nanos).ok()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_from_str() {
        assert_eq!("s".parse::<Precision>().unwrap(), Precision::Seconds);
        assert_eq!("m".parse::<Precision>().unwrap(), Precision::Milliseconds);
        assert_eq!("u".parse::<Precision>().unwrap(), Precision::Microseconds);
    }

    #[test]
    fn test_precision_rejects_unknown() {
        for bad in ["", "ns", "ms", "us", "S", "h", "seconds", "milliseconds", "microseconds", "s "] {
            assert!(
                matches!(bad.parse::<Precision>(), Err(Error::InvalidArgument(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_precision_display_is_wire_code() {
        assert_eq!(Precision::Seconds.to_string(), "s");
        assert_eq!(Precision::Milliseconds.to_string(), "m");
        assert_eq!(Precision::Microseconds.to_string(), "u");
    }

    #[test]
    fn test_precision_deserialize() {
        let p: Precision = serde_json::from_str(r#""m""#).unwrap();
        assert_eq!(p, Precision::Milliseconds);
        assert!(serde_json::from_str::<Precision>(r#""x""#).is_err());
    }

    #[test]
    fn test_precision_convert() {
        let s = Precision::Seconds;
        let ms = Precision::Milliseconds;
        let us = Precision::Microseconds;

        assert_eq!(s.convert(1_700_000_000, us), Some(1_700_000_000_000_000));
        assert_eq!(us.convert(1_700_000_000_123_456, ms), Some(1_700_000_000_123));
        assert_eq!(ms.convert(1_999, s), Some(1));
        assert_eq!(ms.convert(-1, s), Some(-1));
        assert_eq!(us.convert(42, us), Some(42));
        assert_eq!(s.convert(i64::MAX, ms), None);
    }

    #[test]
    fn test_point_columns_match_values() {
        let point = Point::new().field("type", "/foobar").field("karma", 10);
        assert_eq!(point.columns(), vec!["type", "karma"]);
        assert_eq!(point.values(), vec![Value::from("/foobar"), Value::Long(10)]);
    }

    #[test]
    fn test_point_field_replaces_in_place() {
        let point = Point::new()
            .field("a", 1)
            .field("b", 2)
            .field("a", 3);
        assert_eq!(point.columns(), vec!["a", "b"]);
        assert_eq!(point.values(), vec![Value::Long(3), Value::Long(2)]);
    }

    #[test]
    fn test_point_explicit_time_leads() {
        let point = Point::new().field("time", 5).field("karma", 10).at(99);
        assert_eq!(point.columns(), vec!["time", "karma"]);
        assert_eq!(point.values(), vec![Value::Long(99), Value::Long(10)]);
    }

    #[test]
    fn test_point_from_iter() {
        let point: Point = [("type", Value::from("/barfoo")), ("karma", Value::from(30))]
            .into_iter()
            .collect();
        assert_eq!(point.fields().len(), 2);
        assert_eq!(point.time(), None);
    }

    #[test]
    fn test_row_datetime() {
        let row = Row {
            series: "foobar".to_string(),
            time: Some(1_700_000_000_250),
            precision: Precision::Milliseconds,
            values: BTreeMap::new(),
        };
        let dt = row.datetime().unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_row_accessors() {
        let mut values = BTreeMap::new();
        values.insert("type".to_string(), Value::from("/foobar"));
        values.insert("mean".to_string(), Value::Long(15));
        let row = Row {
            series: "foobar".to_string(),
            time: None,
            precision: Precision::Seconds,
            values,
        };
        assert_eq!(row.get_string("type"), Some("/foobar".to_string()));
        assert_eq!(row.get_number("mean"), Some(15.0));
        assert_eq!(row.get_double("mean"), None);
        assert_eq!(row.get_long("mean"), Some(15));
        assert!(row.datetime().is_none());
    }
}
