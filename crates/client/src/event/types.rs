//! Event types and the record sent to the ingestion endpoint
//!
//! One [`EventRecord`] is serialized per tracker call.

use serde::{Deserialize, Serialize};

use crate::event::Properties;
use crate::lib_info::LibProperties;

/// Record types accepted by the ingestion endpoint
///
/// Track types land in the events table, profile types update the users table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// User action
    Track,
    /// Links an anonymous id to a registered id
    TrackSignup,
    /// Set profile properties, overwriting existing values
    ProfileSet,
    /// Set profile properties only if absent
    ProfileSetOnce,
    /// Add to numeric profile properties
    ProfileIncrement,
    /// Append to list profile properties
    ProfileAppend,
    /// Remove profile properties
    ProfileUnset,
    /// Remove the whole profile
    ProfileDelete,
}

impl EventType {
    /// Wire name of the type
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::TrackSignup => "track_signup",
            Self::ProfileSet => "profile_set",
            Self::ProfileSetOnce => "profile_set_once",
            Self::ProfileIncrement => "profile_increment",
            Self::ProfileAppend => "profile_append",
            Self::ProfileUnset => "profile_unset",
            Self::ProfileDelete => "profile_delete",
        }
    }

    /// Whether records of this type carry an `event` name
    #[inline]
    pub const fn has_event(self) -> bool {
        matches!(self, Self::Track | Self::TrackSignup)
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single event as it appears on the wire
///
/// `properties` is a map, so an empty set of properties always encodes as
/// `{}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Record type
    #[serde(rename = "type")]
    pub kind: EventType,

    /// Epoch milliseconds
    pub time: i64,

    /// Identifier of the tracked user
    pub distinct_id: String,

    /// Event name (track types only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,

    /// Pre-signup identifier (track_signup only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,

    /// Event or profile properties
    #[serde(default)]
    pub properties: Properties,

    /// SDK metadata
    pub lib: LibProperties,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_wire_names() {
        for (kind, name) in [
            (EventType::Track, "track"),
            (EventType::TrackSignup, "track_signup"),
            (EventType::ProfileSet, "profile_set"),
            (EventType::ProfileSetOnce, "profile_set_once"),
            (EventType::ProfileIncrement, "profile_increment"),
            (EventType::ProfileAppend, "profile_append"),
            (EventType::ProfileUnset, "profile_unset"),
            (EventType::ProfileDelete, "profile_delete"),
        ] {
            assert_eq!(kind.as_str(), name);
            assert_eq!(
                serde_json::to_string(&kind).unwrap(),
                format!("\"{}\"", name)
            );
        }
    }

    #[test]
    fn test_event_type_has_event() {
        assert!(EventType::Track.has_event());
        assert!(EventType::TrackSignup.has_event());
        assert!(!EventType::ProfileSet.has_event());
        assert!(!EventType::ProfileDelete.has_event());
    }
}
