//! Scalar values carried in points and query rows.

use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// A single column value.
///
/// The JSON API only carries scalars, so this covers strings, numbers,
/// booleans and null.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// String value.
    String(String),

    /// 64-bit floating point value.
    Double(OrderedFloat<f64>),

    /// Boolean value.
    Bool(bool),

    /// Signed 64-bit integer.
    Long(i64),

    /// Unsigned integer too large for `Long`.
    UnsignedLong(u64),

    /// Null value.
    Null,
}

impl Value {
    /// Convert a decoded JSON scalar into a `Value`.
    ///
    /// Arrays and objects are rejected rather than flattened.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Long(i))
                } else if let Some(u) = n.as_u64() {
                    Ok(Value::UnsignedLong(u))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Double(OrderedFloat::from(f)))
                } else {
                    Err(Error::MalformedResponse(format!("unrepresentable number {}", n)))
                }
            }
            other => Err(Error::MalformedResponse(format!(
                "expected a scalar value, got {}",
                other
            ))),
        }
    }

    /// Returns the value as a string reference if it is a `String` variant.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an owned string if it is a `String` variant.
    pub fn string(&self) -> Option<String> {
        self.as_string().map(str::to_string)
    }

    /// Returns the value as a f64 if it is a `Double` variant.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(f.into_inner()),
            _ => None,
        }
    }

    /// Returns any numeric variant widened to f64.
    ///
    /// Aggregates such as `mean` come back as integers or floats depending on
    /// the data, so this is usually what callers want for them.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Double(f) => Some(f.into_inner()),
            Value::Long(i) => Some(*i as f64),
            Value::UnsignedLong(u) => Some(*u as f64),
            _ => None,
        }
    }

    /// Returns the value as a bool if it is a `Bool` variant.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an i64 if it is a `Long` variant.
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a u64 if it is an `UnsignedLong` variant.
    pub fn as_unsigned_long(&self) -> Option<u64> {
        match self {
            Value::UnsignedLong(u) => Some(*u),
            _ => None,
        }
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Double(d) => serializer.serialize_f64(d.into_inner()),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Long(i) => serializer.serialize_i64(*i),
            Value::UnsignedLong(u) => serializer.serialize_u64(*u),
            Value::Null => serializer.serialize_unit(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Double(d) => write!(f, "{}", d),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Long(i) => write!(f, "{}", i),
            Value::UnsignedLong(u) => write!(f, "{}", u),
            Value::Null => write!(f, "null"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Long(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Long(i)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Value::Long(i64::from(u))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Long(i),
            Err(_) => Value::UnsignedLong(u),
        }
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Double(OrderedFloat::from(f))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
