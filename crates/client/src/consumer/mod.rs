//! Consumers - delivery strategies for serialized events
//!
//! A tracker hands every encoded record to a [`Consumer`]. The consumer decides
//! whether to buffer it, send it or write it to disk.
//!
//! | Consumer | Delivery | On failure |
//! |----------|----------|------------|
//! | [`BatchConsumer`] | buffered HTTP POST, flushed at a size threshold | `Ok(false)`, events kept |
//! | [`DebugConsumer`] | one HTTP POST per event to `/debug` | `Err(Error::Debug)` |
//! | [`FileConsumer`] | newline-delimited JSON, append-only | `Ok(false)` |

mod batch;
pub mod codec;
mod debug;
mod file;
mod http;

#[cfg(test)]
mod debug_test;

pub use batch::{BatchConsumer, BatchConsumerConfig};
pub use debug::{DebugConsumer, DebugConsumerConfig, debug_url};
pub use file::{FileConsumer, FileConsumerConfig};
pub use http::USER_AGENT;

use crate::error::Result;

/// Delivery strategy for encoded events
///
/// `Ok(false)` means the event (or batch) could not be delivered and the
/// caller may try again. `Err` is reserved for failures that must not be
/// ignored, such as every failure in debug mode.
///
/// Consumers are `Send` so a tracker can be shared behind a `Mutex`.
pub trait Consumer: Send {
    /// Accept one JSON-encoded record
    fn send(&mut self, message: String) -> Result<bool>;

    /// Deliver anything still buffered
    fn flush(&mut self) -> Result<bool> {
        Ok(true)
    }

    /// Deliver anything still buffered and release resources
    fn close(&mut self) -> Result<bool> {
        Ok(true)
    }
}

impl<C: Consumer + ?Sized> Consumer for Box<C> {
    fn send(&mut self, message: String) -> Result<bool> {
        (**self).send(message)
    }

    fn flush(&mut self) -> Result<bool> {
        (**self).flush()
    }

    fn close(&mut self) -> Result<bool> {
        (**self).close()
    }
}
