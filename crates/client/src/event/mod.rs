//! Event module - records, property values and normalization
//!
//! Everything a tracker call produces before it is handed to a consumer.

mod normalize;
mod types;
mod value;


pub use normalize::{
    MAX_ID_LENGTH, MAX_PROPERTY_VALUE_LENGTH, RESERVED_NAMES, is_valid_name, normalize,
    normalize_time,
};
pub(crate) use normalize::check_id;
pub use types::{EventRecord, EventType};
pub use value::{DATETIME_FORMAT, Properties, PropertyValue, properties};
