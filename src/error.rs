//! Error types for the keel crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the keel pipeline and its drivers.
#[derive(Error, Debug)]
pub enum KeelError {
    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown rule: {0}")]
    UnknownRule(String),

    #[error("unknown output format: {0}")]
    UnknownFormat(String),

    #[error("registry lookup failed for {image}:{tag}: {reason}")]
    DigestLookup {
        image: String,
        tag: String,
        reason: String,
    },

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KeelError>;
