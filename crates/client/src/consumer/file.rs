//! File consumer - newline-delimited JSON on local disk
//!
//! Appends one record per line. Some other process is expected to ship the
//! file to the server.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::consumer::Consumer;
use crate::error::Result;

/// Configuration for [`FileConsumer`]
///
/// ```toml
/// [consumer]
/// type = "file"
/// path = "/var/log/sensors/events.log"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConsumerConfig {
    /// File to append to (created if missing)
    pub path: PathBuf,
}

/// Appends each event to a file, one per line
#[derive(Debug)]
pub struct FileConsumer {
    path: PathBuf,
    file: Option<File>,
}

impl FileConsumer {
    /// Open `path` for appending, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self {
            path,
            file: Some(file),
        })
    }

    /// Path of the output file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the file handle is still open
    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl Consumer for FileConsumer {
    fn send(&mut self, message: String) -> Result<bool> {
        let Some(file) = self.file.as_mut() else {
            warn!(path = %self.path.display(), "event dropped, file consumer is closed");
            return Ok(false);
        };

        let mut line = message;
        line.push('\n');

        match file.write_all(line.as_bytes()) {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "failed to write event");
                Ok(false)
            }
        }
    }

    fn close(&mut self) -> Result<bool> {
        Ok(self.file.take().is_some())
    }
}
