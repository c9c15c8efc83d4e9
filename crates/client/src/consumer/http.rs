//! Blocking HTTP transport shared by the network consumers

use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::{Client, Response};

use crate::consumer::codec;
use crate::error::{Error, Result};

/// User agent sent with every request
pub const USER_AGENT: &str = concat!("sensors-analytics-rust-sdk/", env!("CARGO_PKG_VERSION"));

/// Header asking the debug endpoint to validate without storing
const DRY_RUN_HEADER: &str = "Dry-Run";

/// POSTs `data_list` payloads to one endpoint
#[derive(Debug, Clone)]
pub(crate) struct HttpTransport {
    client: Client,
    url: Url,
}

impl HttpTransport {
    /// `timeout` bounds both connecting and the whole request.
    pub(crate) fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self { client, url })
    }

    pub(crate) fn url(&self) -> &Url {
        &self.url
    }

    /// Send one encoded payload; any received response counts as delivered
    pub(crate) fn post(&self, data_list: &str, dry_run: bool) -> reqwest::Result<Response> {
        let mut request = self
            .client
            .post(self.url.clone())
            .form(&codec::form_fields(data_list));

        if dry_run {
            request = request.header(DRY_RUN_HEADER, "true");
        }

        request.send()
    }
}
