//! Outcome reporting
//!
//! Fire-and-forget notifications for the user plus diagnostic log entries.
//! Nothing the reporter does feeds back into the pipeline.

use std::error::Error as StdError;
use tracing::{error, info};

/// User-facing notification and diagnostic sink
pub trait OutcomeReporter: Send + Sync {
    fn notify_info(&self, message: &str);

    fn notify_error(&self, message: &str);

    /// Record the underlying cause of a failure
    fn log_error(&self, context: &str, cause: &(dyn StdError + 'static));
}

/// Render an error with its `source()` chain: `outer: inner: root`
pub fn error_chain(cause: &(dyn StdError + 'static)) -> String {
    let mut rendered = cause.to_string();
    let mut current = cause.source();
    while let Some(source) = current {
        let text = source.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        current = source.source();
    }
    rendered
}

/// Reports everything as `tracing` events
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl OutcomeReporter for TracingReporter {
    fn notify_info(&self, message: &str) {
        info!(target: "cimp::notify", "{}", message);
    }

    fn notify_error(&self, message: &str) {
        error!(target: "cimp::notify", "{}", message);
    }

    fn log_error(&self, context: &str, cause: &(dyn StdError + 'static)) {
        error!(context, "{}", error_chain(cause));
    }
}

/// Prints notifications to the terminal; diagnostics go to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl OutcomeReporter for ConsoleReporter {
    fn notify_info(&self, message: &str) {
        println!("{}", message);
    }

    fn notify_error(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn log_error(&self, context: &str, cause: &(dyn StdError + 'static)) {
        error!(context, "{}", error_chain(cause));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecodeError;
    use std::path::PathBuf;

    #[test]
    fn test_error_chain_includes_source() {
        let err = DecodeError::Read {
            path: PathBuf::from("a.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        let rendered = error_chain(&err);
        assert!(rendered.starts_with("failed to read"));
        assert!(rendered.contains("gone"));
    }

    #[test]
    fn test_error_chain_skips_repeated_text() {
        let err = crate::error::ImportError::from(DecodeError::Read {
            path: PathBuf::from("a.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        });
        let rendered = error_chain(&err);
        assert_eq!(rendered.matches("gone").count(), 1);
    }
}
