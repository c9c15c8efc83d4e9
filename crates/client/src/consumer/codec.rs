//! `data_list` wire encoding
//!
//! `data_list = base64(gzip("[" + messages.join(",") + "]"))`, posted as a
//! form field next to `gzip=1`.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::error::{Error, Result};

/// Form field carrying the encoded events
pub const DATA_LIST_FIELD: &str = "data_list";

/// Form field flagging the payload as gzipped
pub const GZIP_FIELD: &str = "gzip";

/// Encode already-serialized records into a `data_list` value
///
/// Messages are joined verbatim, so each must be a complete JSON document.
pub fn encode_message_list<S: AsRef<str>>(messages: &[S]) -> Result<String> {
    let capacity = messages.iter().map(|m| m.as_ref().len() + 1).sum::<usize>() + 2;
    let mut json = String::with_capacity(capacity);
    json.push('[');
    for (i, message) in messages.iter().enumerate() {
        if i > 0 {
            json.push(',');
        }
        json.push_str(message.as_ref());
    }
    json.push(']');

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(json.as_bytes())?;
    let compressed = encoder.finish()?;

    Ok(STANDARD.encode(compressed))
}

/// Decode a `data_list` value back into its JSON records
///
/// # Errors
///
/// Returns [`Error::Encoding`] if the value is not base64-encoded gzip of a
/// JSON array.
pub fn decode_data_list(data_list: &str) -> Result<Vec<serde_json::Value>> {
    let compressed = STANDARD
        .decode(data_list.trim())
        .map_err(|e| Error::Encoding(format!("invalid base64: {e}")))?;

    let mut json = String::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_string(&mut json)
        .map_err(|e| Error::Encoding(format!("invalid gzip: {e}")))?;

    serde_json::from_str(&json).map_err(|e| Error::Encoding(format!("invalid json array: {e}")))
}

/// Form fields for a request carrying `data_list`
#[inline]
pub fn form_fields(data_list: &str) -> [(&'static str, &str); 2] {
    [(DATA_LIST_FIELD, data_list), (GZIP_FIELD, "1")]
}
