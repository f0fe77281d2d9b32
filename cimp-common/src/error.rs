//! Common error types for CIMP

use thiserror::Error;

/// Common result type for CIMP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the CIMP crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Message catalog could not be read or parsed
    #[error("Message catalog error: {0}")]
    Catalog(String),
}
