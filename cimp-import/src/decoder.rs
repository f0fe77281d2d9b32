//! Decoder: bytes/text → JSON value
//!
//! Decoding is all-or-nothing; a malformed document never yields a partial value.

use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Malformed input bytes or syntax
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not syntactically valid JSON
    #[error("invalid JSON at line {}, column {}: {0}", .0.line(), .0.column())]
    Syntax(#[source] serde_json::Error),

    /// Bytes are not UTF-8 text
    #[error("input is not UTF-8 text: {0}")]
    Encoding(#[source] std::str::Utf8Error),

    /// Bytes could not be read from the source
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source refused a file that is not JSON
    #[error("{path:?} is not a .json file")]
    UnsupportedFile { path: PathBuf },
}

/// Parse JSON text
pub fn decode(text: &str) -> Result<Value, DecodeError> {
    serde_json::from_str(text).map_err(DecodeError::Syntax)
}

/// Parse UTF-8 bytes as JSON, tolerating a leading byte-order mark
pub fn decode_bytes(bytes: &[u8]) -> Result<Value, DecodeError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(DecodeError::Encoding)?;
    decode(text)
}
