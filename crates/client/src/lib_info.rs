//! SDK metadata attached to every record
//!
//! The `lib` object tells the server which SDK produced an event and where in
//! the host application the call was made.

use std::panic::Location;

use serde::{Deserialize, Serialize};

use crate::event::{Properties, PropertyValue};

/// Library name reported in `$lib`
pub const LIB_NAME: &str = "rust";

/// Method reported in `$lib_method` (events emitted from code)
pub const LIB_METHOD: &str = "code";

/// Version of this crate, the default for `$lib_version`
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Super-property key that is mirrored into `$app_version`
pub const APP_VERSION_KEY: &str = "$app_version";

/// The `lib` object of an event record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibProperties {
    #[serde(rename = "$lib")]
    pub lib: String,

    #[serde(rename = "$lib_version")]
    pub lib_version: String,

    #[serde(rename = "$lib_method")]
    pub lib_method: String,

    /// Call-site descriptor, empty when unavailable
    #[serde(rename = "$lib_detail", default)]
    pub lib_detail: String,

    #[serde(
        rename = "$app_version",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub app_version: Option<PropertyValue>,
}

/// Source of the `$lib_detail` descriptor
///
/// Implementations must not fail: when nothing useful is known they return an
/// empty string.
pub trait CallSite: Send + Sync {
    /// Describe the call made at `caller`
    fn describe(&self, caller: &Location<'_>) -> String;
}

/// Reports the host application's `file##line`
///
/// The location is captured with `#[track_caller]` through the public tracker
/// methods. Rust does not expose the calling function's name, so the class and
/// function segments stay empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallerLocation;

impl CallSite for CallerLocation {
    fn describe(&self, caller: &Location<'_>) -> String {
        format!("####{}##{}", caller.file(), caller.line())
    }
}

/// Never reports a call site
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCallSite;

impl CallSite for NoCallSite {
    fn describe(&self, _caller: &Location<'_>) -> String {
        String::new()
    }
}

/// Builds [`LibProperties`] for each record
pub struct LibCollector {
    version: String,
    call_site: Box<dyn CallSite>,
}

impl LibCollector {
    /// Create a collector reporting `version` with the given call-site source
    pub fn new(version: impl Into<String>, call_site: Box<dyn CallSite>) -> Self {
        Self {
            version: version.into(),
            call_site,
        }
    }

    /// Reported SDK version
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Default `$lib`/`$lib_version` super-properties
    pub fn default_super_properties(&self) -> Properties {
        Properties::from([
            ("$lib".to_string(), PropertyValue::from(LIB_NAME)),
            (
                "$lib_version".to_string(),
                PropertyValue::from(self.version.as_str()),
            ),
        ])
    }

    /// Collect metadata for a call made at `caller`
    pub fn collect(&self, super_properties: &Properties, caller: &Location<'_>) -> LibProperties {
        LibProperties {
            lib: LIB_NAME.to_string(),
            lib_version: self.version.clone(),
            lib_method: LIB_METHOD.to_string(),
            lib_detail: self.call_site.describe(caller),
            app_version: super_properties.get(APP_VERSION_KEY).cloned(),
        }
    }
}

impl Default for LibCollector {
    fn default() -> Self {
        Self::new(SDK_VERSION, Box::new(CallerLocation))
    }
}

impl std::fmt::Debug for LibCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibCollector")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
