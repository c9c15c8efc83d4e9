//! Sensors Analytics Client Library
//!
//! Server-side SDK for reporting user events and profile updates to a
//! Sensors Analytics ingestion endpoint.
//!
//! # Architecture
//!
//! - [`tracker`] - Public API; builds, normalizes and serializes records
//! - [`event`] - Record types, property values and validation rules
//! - [`lib_info`] - SDK metadata (`lib` object) attached to each record
//! - [`consumer`] - Delivery strategies (batch HTTP, debug HTTP, local file)
//! - [`config`] - TOML configuration for picking a consumer at deploy time
//!
//! # Quick Start
//!
//! ```no_run
//! use sensors_client::Tracker;
//! use sensors_client::consumer::{BatchConsumer, BatchConsumerConfig};
//! use sensors_client::event::{properties, PropertyValue};
//!
//! let consumer = BatchConsumer::new(
//!     BatchConsumerConfig::new("https://sa.example.com:8106/sa?project=default"),
//! )?;
//! let mut tracker = Tracker::new(consumer);
//!
//! tracker.register_super_properties(properties([("$app_version", "2.1.0")]));
//! tracker.track(
//!     "user-42",
//!     "ViewProduct",
//!     properties([
//!         ("product_id", PropertyValue::from("sku-1")),
//!         ("price", 9.99.into()),
//!     ]),
//! )?;
//! tracker.profile_set("user-42", properties([("name", "Ada")]))?;
//!
//! tracker.close()?;
//! # Ok::<(), sensors_client::Error>(())
//! ```
//!
//! # Wire Format
//!
//! Each record is one JSON object. HTTP consumers send a batch as the form
//! field `data_list`: the records joined into a JSON array, gzipped, then
//! base64-encoded, alongside `gzip=1`. See [`consumer::codec`].

mod error;

pub mod config;
pub mod consumer;
pub mod event;
pub mod lib_info;
pub mod test;
pub mod tracker;


// Re-export main types at crate root for convenience
pub use config::{ClientConfig, ConsumerConfig, LogConfig, LogLevel};
pub use consumer::Consumer;
pub use error::{DebugError, Error, Result};
pub use tracker::{Tracker, TrackerBuilder};
