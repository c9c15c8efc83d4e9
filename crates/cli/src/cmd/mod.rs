//! Command implementations for the Sensors CLI

pub mod decode;
pub mod profile;
pub mod track;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use sensors_client::consumer::{BatchConsumerConfig, DebugConsumerConfig, FileConsumerConfig};
use sensors_client::event::{Properties, PropertyValue};
use sensors_client::{ClientConfig, Consumer, ConsumerConfig, Tracker};
use tracing::warn;

/// Consumer selection when no config file is given
#[derive(Args, Debug, Default)]
pub struct ConsumerArgs {
    /// Ingestion endpoint URL
    #[arg(short, long, conflicts_with = "file")]
    url: Option<String>,

    /// Send through the debug endpoint and print the server verdict
    #[arg(long, requires = "url")]
    debug: bool,

    /// With --debug: validate without storing
    #[arg(long, requires = "debug")]
    dry_run: bool,

    /// Append events to a local file instead of sending them
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl ConsumerArgs {
    /// Consumer config described by the flags, if any were given
    fn consumer_config(&self) -> Option<ConsumerConfig> {
        if let Some(path) = &self.file {
            return Some(ConsumerConfig::File(FileConsumerConfig { path: path.clone() }));
        }

        let url = self.url.clone()?;
        Some(if self.debug {
            let mut config = DebugConsumerConfig::new(url);
            if self.dry_run {
                config = config.dry_run();
            }
            ConsumerConfig::Debug(config)
        } else {
            ConsumerConfig::Batch(BatchConsumerConfig::new(url))
        })
    }
}

/// Resolve the client config: consumer flags > config file
pub fn resolve_config(args: &ConsumerArgs, config_path: Option<&Path>) -> Result<ClientConfig> {
    let from_file = match config_path {
        Some(path) => Some(
            ClientConfig::from_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
        ),
        None => None,
    };

    match (args.consumer_config(), from_file) {
        (Some(consumer), Some(mut config)) => {
            config.consumer = consumer;
            Ok(config)
        }
        (Some(consumer), None) => Ok(ClientConfig::new(consumer)),
        (None, Some(config)) => Ok(config),
        (None, None) => bail!("no consumer configured: pass --config, --url or --file"),
    }
}

/// Build a tracker for the resolved config
pub fn tracker(
    args: &ConsumerArgs,
    config_path: Option<&Path>,
) -> Result<Tracker<Box<dyn Consumer>>> {
    let config = resolve_config(args, config_path)?;
    Tracker::from_config(&config)
        .with_context(|| format!("failed to create {} consumer", config.consumer.kind()))
}

/// Parse `--properties` JSON into typed properties
pub fn parse_properties(raw: Option<&str>) -> Result<Properties> {
    let Some(raw) = raw else {
        return Ok(Properties::new());
    };

    let value: serde_json::Value =
        serde_json::from_str(raw).context("properties must be valid JSON")?;
    let serde_json::Value::Object(map) = value else {
        bail!("properties must be a JSON object");
    };

    map.into_iter()
        .map(|(key, value)| {
            let value = PropertyValue::try_from(value)
                .with_context(|| format!("invalid value for property '{key}'"))?;
            Ok::<_, anyhow::Error>((key, value))
        })
        .collect()
}

/// Close the tracker and report the outcome
pub fn finish(mut tracker: Tracker<Box<dyn Consumer>>, what: &str) -> Result<()> {
    let delivered = tracker.close().context("failed to deliver")?;
    if delivered {
        println!("{what}: sent");
    } else {
        warn!("delivery failed, events were not sent");
        println!("{what}: not delivered");
    }
    Ok(())
}
