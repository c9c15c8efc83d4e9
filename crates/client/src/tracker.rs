//! Tracker - the public entry point
//!
//! Every tracker method builds one record and funnels it through the same
//! steps: extract the `$time` override, attach lib metadata, normalize,
//! serialize, hand the JSON string to the consumer.

use std::panic::Location;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::trace;

use crate::consumer::Consumer;
use crate::error::{Error, Result};
use crate::event::{EventRecord, EventType, Properties, PropertyValue, check_id, normalize};
use crate::lib_info::{CallSite, CallerLocation, LibCollector, SDK_VERSION};

/// Property that overrides the event time (removed from the record)
pub const TIME_OVERRIDE_KEY: &str = "$time";

/// Event name used by [`Tracker::track_signup`]
pub const SIGNUP_EVENT: &str = "$SignUp";

/// Emits events and profile updates through a [`Consumer`]
///
/// Not synchronized: share it between threads behind a `Mutex`.
///
/// # Example
///
/// ```no_run
/// use sensors_client::Tracker;
/// use sensors_client::consumer::{BatchConsumer, BatchConsumerConfig};
/// use sensors_client::event::properties;
///
/// let consumer = BatchConsumer::new(BatchConsumerConfig::new("https://sa.example.com/sa"))?;
/// let mut tracker = Tracker::new(consumer);
///
/// tracker.track("u1", "login", properties([("plan", "pro")]))?;
/// tracker.profile_unset_keys("u1", ["age", "city"])?;
/// tracker.close()?;
/// # Ok::<(), sensors_client::Error>(())
/// ```
#[derive(Debug)]
pub struct Tracker<C> {
    consumer: C,
    super_properties: Properties,
    lib: LibCollector,
}

impl<C: Consumer> Tracker<C> {
    /// Create a tracker with default lib metadata
    pub fn new(consumer: C) -> Self {
        Self::builder(consumer).build()
    }

    /// Start building a tracker with custom lib metadata
    pub fn builder(consumer: C) -> TrackerBuilder<C> {
        TrackerBuilder {
            consumer,
            lib_version: SDK_VERSION.to_string(),
            call_site: Box::new(CallerLocation),
            super_properties: Properties::new(),
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Track a user action
    ///
    /// Super-properties are merged in; `properties` win on key collisions.
    #[track_caller]
    pub fn track(&mut self, distinct_id: &str, event: &str, properties: Properties) -> Result<bool> {
        let properties = self.with_super_properties(properties);
        self.track_event(EventType::Track, distinct_id, Some(event), None, properties)
    }

    /// Link a pre-signup id to the registered `distinct_id`
    #[track_caller]
    pub fn track_signup(
        &mut self,
        distinct_id: &str,
        original_id: &str,
        properties: Properties,
    ) -> Result<bool> {
        check_id("original_id", original_id)?;
        let properties = self.with_super_properties(properties);
        self.track_event(
            EventType::TrackSignup,
            distinct_id,
            Some(SIGNUP_EVENT),
            Some(original_id),
            properties,
        )
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Set profile properties, overwriting existing values
    #[track_caller]
    pub fn profile_set(&mut self, distinct_id: &str, properties: Properties) -> Result<bool> {
        self.track_event(EventType::ProfileSet, distinct_id, None, None, properties)
    }

    /// Set profile properties that are not set yet
    #[track_caller]
    pub fn profile_set_once(&mut self, distinct_id: &str, properties: Properties) -> Result<bool> {
        self.track_event(EventType::ProfileSetOnce, distinct_id, None, None, properties)
    }

    /// Add to numeric profile properties
    #[track_caller]
    pub fn profile_increment(&mut self, distinct_id: &str, properties: Properties) -> Result<bool> {
        self.track_event(EventType::ProfileIncrement, distinct_id, None, None, properties)
    }

    /// Append to list profile properties
    #[track_caller]
    pub fn profile_append(&mut self, distinct_id: &str, properties: Properties) -> Result<bool> {
        self.track_event(EventType::ProfileAppend, distinct_id, None, None, properties)
    }

    /// Remove the profile properties named by the keys of `properties`
    #[track_caller]
    pub fn profile_unset(&mut self, distinct_id: &str, properties: Properties) -> Result<bool> {
        self.track_event(EventType::ProfileUnset, distinct_id, None, None, properties)
    }

    /// Remove profile properties by name
    ///
    /// Sent as `{key: true, ...}`.
    #[track_caller]
    pub fn profile_unset_keys<I, K>(&mut self, distinct_id: &str, keys: I) -> Result<bool>
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let properties = keys
            .into_iter()
            .map(|key| (key.into(), PropertyValue::Bool(true)))
            .collect();
        self.track_event(EventType::ProfileUnset, distinct_id, None, None, properties)
    }

    /// Remove the whole profile
    #[track_caller]
    pub fn profile_delete(&mut self, distinct_id: &str) -> Result<bool> {
        self.track_event(
            EventType::ProfileDelete,
            distinct_id,
            None,
            None,
            Properties::new(),
        )
    }

    // =========================================================================
    // Super-properties
    // =========================================================================

    /// Merge into the super-properties; new values win
    pub fn register_super_properties(&mut self, properties: Properties) {
        self.super_properties.extend(properties);
    }

    /// Reset super-properties to `$lib` and `$lib_version`
    pub fn clear_super_properties(&mut self) {
        self.super_properties = self.lib.default_super_properties();
    }

    /// Current super-properties
    pub fn super_properties(&self) -> &Properties {
        &self.super_properties
    }

    // =========================================================================
    // Delivery
    // =========================================================================

    /// Ask the consumer to deliver anything buffered
    pub fn flush(&mut self) -> Result<bool> {
        self.consumer.flush()
    }

    /// Flush and release the consumer's resources
    pub fn close(&mut self) -> Result<bool> {
        self.consumer.close()
    }

    /// The active consumer
    pub fn consumer(&self) -> &C {
        &self.consumer
    }

    /// The active consumer, mutably
    pub fn consumer_mut(&mut self) -> &mut C {
        &mut self.consumer
    }

    /// Take the consumer back
    pub fn into_consumer(self) -> C {
        self.consumer
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn with_super_properties(&self, properties: Properties) -> Properties {
        let mut merged = self.super_properties.clone();
        merged.extend(properties);
        merged
    }

    #[track_caller]
    fn track_event(
        &mut self,
        kind: EventType,
        distinct_id: &str,
        event: Option<&str>,
        original_id: Option<&str>,
        mut properties: Properties,
    ) -> Result<bool> {
        let caller = Location::caller();
        let time = extract_time(&mut properties)?;

        let record = normalize(EventRecord {
            kind,
            time,
            distinct_id: distinct_id.to_string(),
            event: event.map(str::to_string),
            original_id: original_id.map(str::to_string),
            properties,
            lib: self.lib.collect(&self.super_properties, caller),
        })?;

        let message = serde_json::to_string(&record)?;
        trace!(kind = %kind, distinct_id, "record normalized");

        self.consumer.send(message)
    }
}

/// Builder for [`Tracker`]
pub struct TrackerBuilder<C> {
    consumer: C,
    lib_version: String,
    call_site: Box<dyn CallSite>,
    super_properties: Properties,
}

impl<C: Consumer> TrackerBuilder<C> {
    /// Override the reported `$lib_version`
    #[must_use]
    pub fn lib_version(mut self, version: impl Into<String>) -> Self {
        self.lib_version = version.into();
        self
    }

    /// Use another `$lib_detail` source
    #[must_use]
    pub fn call_site(mut self, call_site: impl CallSite + 'static) -> Self {
        self.call_site = Box::new(call_site);
        self
    }

    /// Super-properties registered on top of the defaults
    ///
    /// [`Tracker::clear_super_properties`] drops these again.
    #[must_use]
    pub fn super_properties(mut self, properties: Properties) -> Self {
        self.super_properties.extend(properties);
        self
    }

    /// Build the tracker
    pub fn build(self) -> Tracker<C> {
        let lib = LibCollector::new(self.lib_version, self.call_site);
        let mut super_properties = lib.default_super_properties();
        super_properties.extend(self.super_properties);

        Tracker {
            consumer: self.consumer,
            super_properties,
            lib,
        }
    }
}

/// Take the `$time` override out of `properties`, or use the current time
fn extract_time(properties: &mut Properties) -> Result<i64> {
    match properties.remove(TIME_OVERRIDE_KEY) {
        Some(PropertyValue::Int(ts)) => Ok(ts),
        Some(other) => Err(Error::illegal(format!(
            "property [{TIME_OVERRIDE_KEY}] must be an integer timestamp. [value={other:?}]"
        ))),
        None => Ok(now_millis()),
    }
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
