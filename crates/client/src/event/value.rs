//! Property values
//!
//! The ingestion endpoint only understands scalars, lists of strings and
//! date/time values. [`PropertyValue`] makes everything else unrepresentable;
//! untyped JSON goes through `TryFrom<serde_json::Value>`.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Wire format for date/time property values
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S.0";

/// Event or profile properties, keyed by property name
pub type Properties = BTreeMap<String, PropertyValue>;

/// A single property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// List of strings (the only list shape the server accepts)
    List(Vec<String>),
    /// Rendered as [`DATETIME_FORMAT`] during normalization
    DateTime(NaiveDateTime),
}

impl PropertyValue {
    /// Integer value, if this is one
    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// String value, if this is one
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render a date/time the way the server expects it
    pub fn format_datetime(dt: &NaiveDateTime) -> String {
        dt.format(DATETIME_FORMAT).to_string()
    }
}

/// Build a [`Properties`] map from key/value pairs
///
/// ```
/// use sensors_client::event::{properties, PropertyValue};
///
/// let props = properties([("plan", PropertyValue::from("pro")), ("seats", 3.into())]);
/// assert_eq!(props.len(), 2);
/// ```
pub fn properties<K, V, I>(entries: I) -> Properties
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<PropertyValue>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for PropertyValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(v: Vec<String>) -> Self {
        Self::List(v)
    }
}

impl From<Vec<&str>> for PropertyValue {
    fn from(v: Vec<&str>) -> Self {
        Self::List(v.into_iter().map(str::to_string).collect())
    }
}

impl From<NaiveDateTime> for PropertyValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

/// Keeps the wall-clock time of the value's own timezone.
impl<Tz: TimeZone> From<DateTime<Tz>> for PropertyValue {
    fn from(v: DateTime<Tz>) -> Self {
        Self::DateTime(v.naive_local())
    }
}

impl TryFrom<serde_json::Value> for PropertyValue {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Self::Int(i)),
                None => n.as_f64().map(Self::Float).ok_or_else(|| {
                    Error::illegal(format!("property value is not a valid number. [value={n}]"))
                }),
            },
            Value::String(s) => Ok(Self::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(Error::illegal(format!(
                        "[list] property's value must be a str. [value='{other}']"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            Value::Object(_) => Err(Error::illegal(
                "[list] property must not be associative",
            )),
            Value::Null => Err(Error::illegal(
                "property value must be a str/int/float/datetime/list",
            )),
        }
    }
}

// =============================================================================
// Serde
// =============================================================================

impl Serialize for PropertyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::String(v) => serializer.serialize_str(v),
            Self::List(v) => v.serialize(serializer),
            Self::DateTime(v) => serializer.serialize_str(&Self::format_datetime(v)),
        }
    }
}

/// Date/time values come back as strings: the wire format does not tag them.
impl<'de> Deserialize<'de> for PropertyValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::try_from(value).map_err(D::Error::custom)
    }
}
