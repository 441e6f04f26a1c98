//! Error types for the pagescroll binary.
//!
//! Each layer owns its error enum; this module composes them for `main`.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error wrapping all layer failures
//!   - [`ConfigError`] - config file read/parse failures
//!   - [`LoggingError`] - tracing subscriber setup failures
//!   - [`ScriptError`] - replay script read/parse failures
//!   - [`PagingError`] - layout engine contract violations
//!   - `serde_json::Error` - report encoding failures
//!   - `std::io::Error` - stdout write failures
//!
//! # Recovery
//!
//! Contract violations raised while replaying are recorded in the step
//! report and do not abort the run. Everything else is fatal and reaches
//! `main`.

use crate::config::ConfigError;
use crate::logging::LoggingError;
use crate::paging::PagingError;
use crate::replay::ScriptError;
use thiserror::Error;

/// Top-level application error.
///
/// Layer errors convert via `From`, so `main` can use `?` throughout.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Logging could not be initialized.
    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),

    /// Replay script could not be loaded.
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),

    /// Layout engine rejected a call.
    #[error("Paging error: {0}")]
    Paging(#[from] PagingError),

    /// A report could not be encoded as JSON.
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::PageIndex;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn app_error_from_config_error() {
        let err: AppError = ConfigError::ParseError {
            path: PathBuf::from("/tmp/config.toml"),
            reason: "expected a table".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("/tmp/config.toml"));
        assert!(msg.contains("expected a table"));
    }

    #[test]
    fn app_error_from_script_error() {
        let err: AppError = ScriptError::ReadError {
            path: PathBuf::from("session.toml"),
            reason: "No such file".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("Script error"));
        assert!(msg.contains("session.toml"));
    }

    #[test]
    fn app_error_from_paging_error() {
        let err: AppError = PagingError::IndexOutOfRange {
            index: PageIndex::new(7),
            page_count: 3,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Paging error: page index 7 out of range (number of pages: 3)"
        );
    }

    #[test]
    fn app_error_from_logging_error() {
        let err: AppError = LoggingError::SubscriberAlreadySet.into();
        assert!(err.to_string().contains("already initialized"));
    }

    #[test]
    fn app_error_from_io_error() {
        let err: AppError = io::Error::new(io::ErrorKind::BrokenPipe, "pipe broken").into();
        let msg = err.to_string();
        assert!(msg.contains("Output error"));
        assert!(msg.contains("pipe broken"));
    }
}
