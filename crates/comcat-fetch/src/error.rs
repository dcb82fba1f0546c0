//! Error types for the `comcat-fetch` crate.
//!
//! Network failures are not errors here: they are reported as
//! [`FetchOutcome::Failure`](crate::FetchOutcome::Failure). [`FetchError`]
//! covers local problems such as cache I/O, unusable identifiers, and
//! client construction.

use std::path::PathBuf;

use comcat_products::ProductError;

use crate::config::ConfigError;

/// Errors that can occur in the download client or cache.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A cache file or directory could not be written or read.
    #[error("cache I/O error at {}: {source}", path.display())]
    Cache {
        /// The path that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The event id cannot be used as a cache file name.
    #[error("invalid event id {0:?}")]
    InvalidEventId(String),

    /// A content URL has no final path segment to name the file by.
    #[error("content URL {0:?} has no file name")]
    InvalidContentName(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    /// A cached or downloaded document could not be interpreted.
    #[error(transparent)]
    Product(#[from] ProductError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}
