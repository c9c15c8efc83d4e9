//! Test helpers for code that emits events
//!
//! Blocking, in-process stand-ins for the ingestion endpoint. No TLS, no
//! chunked bodies - just enough HTTP/1.1 for the consumers in this crate.
//!
//! # Helpers
//!
//! - [`MockServer`] - records every request and answers with a fixed status
//! - [`unused_local_url`] / [`unused_local_addr`] - an endpoint nothing is listening on
//!
//! # Example
//!
//! ```ignore
//! use sensors_client::test::MockServer;
//!
//! let server = MockServer::start()?;
//! let mut consumer = BatchConsumer::new(BatchConsumerConfig::new(server.url("/sa")))?;
//! consumer.send(event)?;
//! consumer.flush()?;
//! assert_eq!(server.requests()[0].events().len(), 1);
//! ```


pub use http::{MockServer, RecordedRequest, unused_local_addr, unused_local_url};
