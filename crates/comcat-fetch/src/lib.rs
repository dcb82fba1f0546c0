//! Catalog download client and on-disk cache.
//!
//! The product crates work on documents that are already in memory. This
//! crate is the collaborator that puts them there: it downloads detail
//! documents and content files over HTTP and keeps them in a local data
//! directory.
//!
//! # Architecture
//!
//! ```text
//! CatalogConfig --> HttpTransport (caller-built reqwest::Client)
//!                        |
//!                  CatalogClient --> FetchOutcome --> EventCache --> EventRecord
//! ```
//!
//! A failed download is never an error to the caller: it surfaces as
//! [`FetchOutcome::Failure`], or as `None` where an [`EventRecord`] was
//! expected, meaning "no data for this event".
//!
//! [`EventRecord`]: comcat_products::EventRecord

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use cache::EventCache;
pub use client::{CatalogClient, ContentDownload};
pub use config::{CacheSection, CatalogConfig, CatalogSection, ConfigError};
pub use error::FetchError;
pub use transport::{FetchOutcome, HttpTransport, Transport};
