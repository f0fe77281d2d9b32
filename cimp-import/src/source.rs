//! Source acquisition
//!
//! Yields the raw bytes of one document, or `None` when the user chose
//! nothing. Cancellation is only possible here; once bytes are handed over the
//! attempt runs to completion.

use crate::decoder::DecodeError;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};

/// Raw document handed to the decoder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// Where the bytes came from (path or "stdin"), for logs
    pub origin: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(origin: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            origin: origin.into(),
            bytes: bytes.into(),
        }
    }
}

/// Pick-or-cancel document source
#[async_trait::async_trait]
pub trait SourceAcquisition: Send + Sync {
    /// `Ok(None)` is the cancel signal
    async fn acquire(&self) -> Result<Option<SourceDocument>, DecodeError>;
}

/// Reads a chosen `.json` file; no path means nothing was chosen
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    path: Option<PathBuf>,
}

impl FileSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    fn is_json(path: &std::path::Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }
}

#[async_trait::async_trait]
impl SourceAcquisition for FileSource {
    async fn acquire(&self) -> Result<Option<SourceDocument>, DecodeError> {
        let Some(path) = &self.path else {
            debug!("No file chosen");
            return Ok(None);
        };

        if !Self::is_json(path) {
            return Err(DecodeError::UnsupportedFile { path: path.clone() });
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DecodeError::Read {
                path: path.clone(),
                source,
            })?;

        info!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Some(SourceDocument::new(path.display().to_string(), bytes)))
    }
}

/// Reads standard input to the end; empty input means nothing was supplied
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinSource;

#[async_trait::async_trait]
impl SourceAcquisition for StdinSource {
    async fn acquire(&self) -> Result<Option<SourceDocument>, DecodeError> {
        let mut bytes = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut bytes)
            .await
            .map_err(|source| DecodeError::Read {
                path: PathBuf::from("<stdin>"),
                source,
            })?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            debug!("Standard input was empty");
            return Ok(None);
        }
        Ok(Some(SourceDocument::new("stdin", bytes)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_no_path_is_cancel() {
        let source = FileSource::new(None);
        assert!(source.acquire().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reads_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Urgath.JSON");
        std::fs::write(&path, b"{}").unwrap();

        let document = FileSource::new(Some(path)).acquire().await.unwrap().unwrap();
        assert_eq!(document.bytes, b"{}");
        assert!(document.origin.ends_with("Urgath.JSON"));
    }

    #[tokio::test]
    async fn test_non_json_extension_refused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"{}").unwrap();

        let err = FileSource::new(Some(path)).acquire().await.unwrap_err();
        assert!(matches!(err, DecodeError::UnsupportedFile { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = FileSource::new(Some(dir.path().join("gone.json")))
            .acquire()
            .await
            .unwrap_err();
        assert!(matches!(err, DecodeError::Read { .. }));
    }
}
