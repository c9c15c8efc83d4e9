//! Debug consumer - synchronous validation against the server
//!
//! Every event is posted on its own to the endpoint's `/debug` path and the
//! server's verdict is printed. Any failure is returned as an error: debug
//! mode is meant for integration testing, not production traffic.

use std::io::{self, Write};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::consumer::Consumer;
use crate::consumer::codec;
use crate::consumer::http::HttpTransport;
use crate::error::{DebugError, Error, Result};

/// Path every debug request is sent to
pub const DEBUG_PATH: &str = "/debug";

const SEPARATOR: &str =
    "=========================================================================";

/// Configuration for [`DebugConsumer`]
///
/// # Example
///
/// ```toml
/// [consumer]
/// type = "debug"
/// url = "https://sa.example.com:8106/sa?project=default"
/// write_data = false   # validate only (Dry-Run)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DebugConsumerConfig {
    /// Ingestion endpoint; its path is replaced with `/debug`
    pub url: String,

    /// Store the events server-side; `false` sends `Dry-Run: true`
    /// Default: true
    pub write_data: bool,

    /// Connect and request timeout
    /// Default: 1s
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl DebugConsumerConfig {
    /// Create a config for `url` that writes data
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Validate without storing (`Dry-Run: true`)
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.write_data = false;
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for DebugConsumerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            write_data: true,
            request_timeout: Duration::from_millis(1000),
        }
    }
}

/// Rewrite an endpoint URL to its debug path
///
/// Scheme, credentials, host, port, query and fragment are kept.
///
/// # Errors
///
/// Returns [`DebugError::InvalidUrl`] if `url` is not an absolute http(s) URL.
pub fn debug_url(url: &str) -> std::result::Result<Url, DebugError> {
    let invalid = |reason: String| DebugError::InvalidUrl {
        url: url.to_string(),
        reason,
    };

    let mut parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }

    parsed.set_path(DEBUG_PATH);
    Ok(parsed)
}

/// Posts each event to the debug endpoint and reports the verdict
///
/// The report goes to stdout unless another writer is installed with
/// [`DebugConsumer::with_output`].
#[derive(Debug)]
pub struct DebugConsumer<W = io::Stdout> {
    transport: HttpTransport,
    write_data: bool,
    output: W,
}

impl DebugConsumer {
    /// Create a debug consumer reporting to stdout
    ///
    /// # Errors
    ///
    /// Returns [`DebugError::InvalidUrl`] for a malformed endpoint.
    pub fn new(config: DebugConsumerConfig) -> Result<Self> {
        let url = debug_url(&config.url)?;

        Ok(Self {
            transport: HttpTransport::new(url, config.request_timeout)?,
            write_data: config.write_data,
            output: io::stdout(),
        })
    }
}

impl<W: Write> DebugConsumer<W> {
    /// Send the report to another writer
    pub fn with_output<O: Write>(self, output: O) -> DebugConsumer<O> {
        DebugConsumer {
            transport: self.transport,
            write_data: self.write_data,
            output,
        }
    }

    /// The report writer
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Effective debug endpoint
    pub fn url(&self) -> &Url {
        self.transport.url()
    }

    /// Whether events are stored server-side
    pub fn write_data(&self) -> bool {
        self.write_data
    }

    fn report(&mut self, message: &str, status: u16, body: &str) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "{SEPARATOR}")?;
        if status == 200 {
            writeln!(self.output, "valid message: {message}")?;
        } else {
            writeln!(self.output, "invalid message: {message}")?;
            writeln!(self.output, "ret_code: {status}")?;
            writeln!(self.output, "ret_content: {body}")?;
        }
        self.output.flush()
    }
}

impl<W: Write + Send> Consumer for DebugConsumer<W> {
    fn send(&mut self, message: String) -> Result<bool> {
        let data_list = codec::encode_message_list(std::slice::from_ref(&message))?;

        if !self.write_data {
            debug!(url = %self.transport.url(), "dry run, server validates without storing");
            writeln!(self.output)?;
            writeln!(self.output, "try Dry-Run")?;
        }

        let response = self
            .transport
            .post(&data_list, !self.write_data)
            .map_err(|e| DebugError::Connect(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| DebugError::Connect(e.to_string()))?;

        self.report(&message, status, &body)?;

        if status >= 300 {
            return Err(Error::Debug(DebugError::UnexpectedResponse { status, body }));
        }
        Ok(true)
    }
}
