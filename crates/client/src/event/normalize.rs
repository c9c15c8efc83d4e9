//! Event normalization
//!
//! Validates a record against the server's schema rules and rewrites it into
//! its canonical form. Stops at the first violation.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::event::{EventRecord, EventType, PropertyValue};

/// Maximum length of `distinct_id` and `original_id`
pub const MAX_ID_LENGTH: usize = 255;

/// Maximum length of a string property value
pub const MAX_PROPERTY_VALUE_LENGTH: usize = 8191;

/// Names the server reserves for its own columns
pub const RESERVED_NAMES: [&str; 13] = [
    "distinct_id",
    "original_id",
    "time",
    "properties",
    "id",
    "first_id",
    "second_id",
    "users",
    "events",
    "event",
    "user_id",
    "date",
    "datetime",
];

// ASCII classes only: `(?i)` would let Unicode case folding match U+212A
// and U+017F.
static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_$][a-zA-Z0-9_$]{0,99}$").expect("name pattern is a valid regex")
});

/// Whether `name` is usable as an event name or property key
///
/// Letters are ASCII only, in either case. The reserved-word check ignores
/// case.
pub fn is_valid_name(name: &str) -> bool {
    NAME_PATTERN.is_match(name)
        && !RESERVED_NAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

/// Validate and canonicalize a record
///
/// - `time` is coerced to milliseconds
/// - date/time property values are rendered as strings
///
/// # Errors
///
/// Returns [`Error::IllegalData`] on the first violated rule.
pub fn normalize(mut record: EventRecord) -> Result<EventRecord> {
    check_id("distinct_id", &record.distinct_id)?;

    record.time = normalize_time(record.time)?;

    match record.event.as_deref() {
        Some(name) if !is_valid_name(name) => {
            return Err(Error::illegal(format!(
                "event name must be a valid variable name. [name='{name}']"
            )));
        }
        None if record.kind.has_event() => {
            return Err(Error::illegal("property [event] must not be empty"));
        }
        _ => {}
    }

    if record.kind == EventType::TrackSignup {
        let original_id = record.original_id.as_deref().unwrap_or_default();
        check_id("original_id", original_id)?;
    }

    for (key, value) in record.properties.iter_mut() {
        if !is_valid_name(key) {
            return Err(Error::illegal(format!(
                "property key must be a valid variable name. [key='{key}']"
            )));
        }

        match value {
            PropertyValue::String(s) if s.len() > MAX_PROPERTY_VALUE_LENGTH => {
                return Err(Error::illegal(format!(
                    "the max length of property value is {MAX_PROPERTY_VALUE_LENGTH}. [key={key}]"
                )));
            }
            PropertyValue::Float(f) if !f.is_finite() => {
                return Err(Error::illegal(format!(
                    "property value must be a finite number. [key={key}]"
                )));
            }
            PropertyValue::DateTime(dt) => {
                let rendered = PropertyValue::format_datetime(dt);
                *value = PropertyValue::String(rendered);
            }
            _ => {}
        }
    }

    Ok(record)
}

/// Coerce a timestamp to 13-digit milliseconds
///
/// 10 digits are seconds, 13 digits are milliseconds, anything else is
/// rejected.
pub fn normalize_time(ts: i64) -> Result<i64> {
    let digits = if ts > 0 { ts.ilog10() + 1 } else { 0 };
    match digits {
        10 => Ok(ts * 1000),
        13 => Ok(ts),
        _ => Err(Error::illegal(format!(
            "property [time] must be a timestamp in seconds or milliseconds. [time={ts}]"
        ))),
    }
}

/// Validate an identifier field (non-empty, bounded length)
pub(crate) fn check_id(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::illegal(format!("property [{field}] must not be empty")));
    }
    if value.len() > MAX_ID_LENGTH {
        return Err(Error::illegal(format!(
            "the max length of [{field}] is {MAX_ID_LENGTH}"
        )));
    }
    Ok(())
}
