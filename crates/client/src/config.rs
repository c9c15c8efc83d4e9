//! Client configuration
//!
//! TOML-based configuration for applications that pick their consumer at
//! deploy time. Every section is optional except `[consumer]`.
//!
//! # Example
//!
//! ```toml
//! [log]
//! level = "debug"
//!
//! [consumer]
//! type = "batch"
//! url = "https://sa.example.com:8106/sa?project=default"
//! max_size = 50
//! request_timeout = "1s"
//!
//! [super_properties]
//! "$app_version" = "2.1.0"
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::consumer::{
    BatchConsumer, BatchConsumerConfig, Consumer, DebugConsumer, DebugConsumerConfig,
    FileConsumer, FileConsumerConfig,
};
use crate::error::{Error, Result};
use crate::event::{Properties, is_valid_name};
use crate::tracker::Tracker;

/// Log level for applications embedding the client
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to tracing level filter string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Default: info
    pub level: LogLevel,
}

/// Which consumer to build, with its settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConsumerConfig {
    Batch(BatchConsumerConfig),
    Debug(DebugConsumerConfig),
    File(FileConsumerConfig),
}

impl ConsumerConfig {
    /// Consumer type name as written in config
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Batch(_) => "batch",
            Self::Debug(_) => "debug",
            Self::File(_) => "file",
        }
    }

    /// Build the configured consumer
    ///
    /// # Errors
    ///
    /// Returns the construction error of the chosen consumer.
    pub fn build(&self) -> Result<Box<dyn Consumer>> {
        Ok(match self {
            Self::Batch(config) => Box::new(BatchConsumer::new(config.clone())?),
            Self::Debug(config) => Box::new(DebugConsumer::new(config.clone())?),
            Self::File(config) => Box::new(FileConsumer::new(&config.path)?),
        })
    }

    fn validate(&self) -> Result<()> {
        match self {
            Self::Batch(config) => config.validate(),
            Self::Debug(config) if config.url.is_empty() => {
                Err(Error::Config("debug consumer requires a url".to_string()))
            }
            Self::File(config) if config.path.as_os_str().is_empty() => {
                Err(Error::Config("file consumer requires a path".to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Top-level client configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,

    /// Delivery strategy
    pub consumer: ConsumerConfig,

    /// Super-properties registered at startup
    #[serde(default)]
    pub super_properties: Properties,

    /// Report the call site in `$lib_detail`
    /// Default: true
    #[serde(default = "default_lib_detail")]
    pub lib_detail: bool,
}

fn default_lib_detail() -> bool {
    true
}

impl ClientConfig {
    /// Config for `consumer` with every other setting at its default
    pub fn new(consumer: ConsumerConfig) -> Self {
        Self {
            log: LogConfig::default(),
            consumer,
            super_properties: Properties::new(),
            lib_detail: true,
        }
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is not a valid config.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file '{}': {e}", path.display()))
        })?;
        contents.parse()
    }

    fn parse(s: &str) -> Result<Self> {
        let config: ClientConfig =
            toml::from_str(s).map_err(|e| Error::Config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.consumer.validate()?;
        if let Some(key) = self.super_properties.keys().find(|key| !is_valid_name(key)) {
            return Err(Error::Config(format!(
                "super property key must be a valid variable name. [key='{key}']"
            )));
        }
        Ok(())
    }
}

impl FromStr for ClientConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Tracker<Box<dyn Consumer>> {
    /// Build a tracker and its consumer from configuration
    ///
    /// # Errors
    ///
    /// Returns the consumer's construction error.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let builder = Tracker::builder(config.consumer.build()?)
            .super_properties(config.super_properties.clone());

        Ok(if config.lib_detail {
            builder.build()
        } else {
            builder.call_site(crate::lib_info::NoCallSite).build()
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::event::PropertyValue;

    #[test]
    fn test_parse_batch() {
        let config: ClientConfig = r#"
[consumer]
type = "batch"
url = "https://sa.example.com/sa?project=default"
max_size = 10
request_timeout = "3s"
"#
        .parse()
        .unwrap();

        assert_eq!(config.log.level, LogLevel::Info);
        assert!(config.lib_detail);
        assert_eq!(
            config.consumer,
            ConsumerConfig::Batch(
                BatchConsumerConfig::new("https://sa.example.com/sa?project=default")
                    .with_max_size(10)
                    .with_request_timeout(Duration::from_secs(3))
            )
        );
    }

    #[test]
    fn test_parse_batch_defaults() {
        let config: ClientConfig = "[consumer]\ntype = \"batch\"\nurl = \"http://localhost/sa\""
            .parse()
            .unwrap();

        let ConsumerConfig::Batch(batch) = config.consumer else {
            panic!("expected batch consumer");
        };
        assert_eq!(batch.max_size, 50);
        assert_eq!(batch.request_timeout, Duration::from_millis(1000));
    }

    #[test]
    fn test_parse_debug_dry_run() {
        let config: ClientConfig = r#"
[log]
level = "debug"

[consumer]
type = "debug"
url = "http://localhost:8106/sa"
write_data = false
"#
        .parse()
        .unwrap();

        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.consumer.kind(), "debug");
        let ConsumerConfig::Debug(debug) = config.consumer else {
            panic!("expected debug consumer");
        };
        assert!(!debug.write_data);
    }

    #[test]
    fn test_parse_file_with_super_properties() {
        let config: ClientConfig = r#"
lib_detail = false

[consumer]
type = "file"
path = "/tmp/events.log"

[super_properties]
"$app_version" = "2.1.0"
platform = "server"
tags = ["a", "b"]
"#
        .parse()
        .unwrap();

        assert!(!config.lib_detail);
        assert_eq!(
            config.consumer,
            ConsumerConfig::File(FileConsumerConfig {
                path: PathBuf::from("/tmp/events.log")
            })
        );
        assert_eq!(
            config.super_properties["$app_version"],
            PropertyValue::from("2.1.0")
        );
        assert_eq!(
            config.super_properties["tags"],
            PropertyValue::from(vec!["a", "b"])
        );
    }

    #[test]
    fn test_missing_consumer_rejected() {
        assert!(matches!(
            "[log]\nlevel = \"info\"".parse::<ClientConfig>(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_unknown_consumer_type_rejected() {
        assert!("[consumer]\ntype = \"kafka\"".parse::<ClientConfig>().is_err());
    }

    #[test]
    fn test_missing_url_rejected() {
        assert!("[consumer]\ntype = \"batch\"".parse::<ClientConfig>().is_err());
        assert!("[consumer]\ntype = \"debug\"".parse::<ClientConfig>().is_err());
        assert!("[consumer]\ntype = \"file\"\npath = \"\"".parse::<ClientConfig>().is_err());
    }

    #[test]
    fn test_invalid_super_property_key_rejected() {
        let result = r#"
[consumer]
type = "file"
path = "/tmp/events.log"

[super_properties]
time = 1
"#
        .parse::<ClientConfig>();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sensors.toml");
        fs::write(
            &path,
            format!(
                "[consumer]\ntype = \"file\"\npath = \"{}\"\n",
                dir.path().join("events.log").display()
            ),
        )
        .unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.consumer.kind(), "file");
    }

    #[test]
    fn test_from_file_missing() {
        let err = ClientConfig::from_file("/nonexistent/sensors.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/sensors.toml"));
    }

    #[test]
    fn test_tracker_from_config() {
        let dir = TempDir::new().unwrap();
        let events = dir.path().join("events.log");
        let mut config = ClientConfig::new(ConsumerConfig::File(FileConsumerConfig {
            path: events.clone(),
        }));
        config
            .super_properties
            .insert("platform".to_string(), "server".into());
        config.lib_detail = false;

        let mut tracker = Tracker::from_config(&config).unwrap();
        assert_eq!(
            tracker.super_properties()["platform"],
            PropertyValue::from("server")
        );

        tracker.track("u1", "login", Properties::new()).unwrap();
        tracker.close().unwrap();

        let line = fs::read_to_string(&events).unwrap();
        let json: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(json["properties"]["platform"], "server");
        assert_eq!(json["lib"]["$lib_detail"], "");
    }

    #[test]
    fn test_log_level_as_str() {
        assert_eq!(LogLevel::Trace.as_str(), "trace");
        assert_eq!(LogLevel::Warn.as_str(), "warn");
        assert_eq!(LogLevel::default().as_str(), "info");
    }
}
