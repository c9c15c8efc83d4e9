//! Batch consumer - buffered delivery over HTTP
//!
//! Events accumulate in memory until the buffer reaches `max_size`, then the
//! whole buffer goes out in one request. A failed request keeps the buffer so
//! the next flush retries it; nothing is retried automatically.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, trace, warn};

use crate::consumer::Consumer;
use crate::consumer::codec;
use crate::consumer::http::HttpTransport;
use crate::error::{Error, Result};

/// Configuration for [`BatchConsumer`]
///
/// # Example
///
/// ```toml
/// [consumer]
/// type = "batch"
/// url = "https://sa.example.com:8106/sa?project=default"
/// max_size = 50
/// request_timeout = "1s"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatchConsumerConfig {
    /// Ingestion endpoint
    pub url: String,

    /// Number of buffered events that triggers a flush
    /// Default: 50
    pub max_size: usize,

    /// Connect and request timeout
    /// Default: 1s
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl BatchConsumerConfig {
    /// Default flush threshold
    pub const DEFAULT_MAX_SIZE: usize = 50;

    /// Default request timeout
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(1000);

    /// Create a config for `url` with default threshold and timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the flush threshold
    #[must_use]
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Check the config can build a consumer
    pub fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(Error::Config("batch consumer requires a url".to_string()));
        }
        if self.max_size == 0 {
            return Err(Error::Config(
                "batch consumer max_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BatchConsumerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_size: Self::DEFAULT_MAX_SIZE,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Buffers events and POSTs them in batches
///
/// # Example
///
/// ```no_run
/// use sensors_client::consumer::{BatchConsumer, BatchConsumerConfig, Consumer};
///
/// let mut consumer = BatchConsumer::new(
///     BatchConsumerConfig::new("https://sa.example.com/sa").with_max_size(100),
/// )?;
/// consumer.send(r#"{"type":"profile_delete"}"#.to_string())?;
/// consumer.close()?;
/// # Ok::<(), sensors_client::Error>(())
/// ```
#[derive(Debug)]
pub struct BatchConsumer {
    buffer: Vec<String>,
    max_size: usize,
    transport: HttpTransport,
}

impl BatchConsumer {
    /// Create a batch consumer
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an invalid config or unparsable URL, and
    /// [`Error::Http`] if the HTTP client cannot be built.
    pub fn new(config: BatchConsumerConfig) -> Result<Self> {
        config.validate()?;
        let url = Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("invalid server url '{}': {e}", config.url)))?;

        Ok(Self {
            buffer: Vec::with_capacity(config.max_size),
            max_size: config.max_size,
            transport: HttpTransport::new(url, config.request_timeout)?,
        })
    }

    /// Events waiting for the next flush, oldest first
    #[inline]
    pub fn buffered(&self) -> &[String] {
        &self.buffer
    }

    /// Number of buffered events
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Flush threshold
    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Endpoint the batches are posted to
    pub fn url(&self) -> &Url {
        self.transport.url()
    }
}

impl Consumer for BatchConsumer {
    fn send(&mut self, message: String) -> Result<bool> {
        self.buffer.push(message);
        trace!(buffered = self.buffer.len(), "event buffered");

        if self.buffer.len() >= self.max_size {
            return self.flush();
        }
        Ok(true)
    }

    fn flush(&mut self) -> Result<bool> {
        if self.buffer.is_empty() {
            return Ok(true);
        }

        let count = self.buffer.len();
        let data_list = codec::encode_message_list(&self.buffer)?;

        match self.transport.post(&data_list, false) {
            Ok(response) => {
                debug!(
                    events = count,
                    status = response.status().as_u16(),
                    "batch flushed"
                );
                self.buffer.clear();
                Ok(true)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    events = count,
                    url = %self.transport.url(),
                    "batch flush failed, events kept for the next flush"
                );
                Ok(false)
            }
        }
    }

    fn close(&mut self) -> Result<bool> {
        self.flush()
    }
}
