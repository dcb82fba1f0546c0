//! Error types for the `comcat-products` crate.
//!
//! Structural misses (absent product type, unknown source, empty selection)
//! are recoverable: a caller typically skips that product for the event.
//! [`ProductError::InvalidPolicy`] marks a programming error in the caller.

use std::path::PathBuf;

use comcat_types::{InvalidPolicy, PropertyError};

/// Errors that can occur while building or querying product selections.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    /// The event carries no entry for the requested product type.
    #[error("event {event_id} has no product of type {product_type}")]
    ProductTypeNotFound {
        /// The event queried.
        event_id: String,
        /// The missing product type.
        product_type: String,
    },

    /// The product type is present but lists no submissions.
    #[error("no submissions for product type {product_type}")]
    NoSubmissions {
        /// The empty product type.
        product_type: String,
    },

    /// An explicitly requested source contributed nothing of this type.
    #[error("no {product_type} products found for source {source_id:?}")]
    SourceNotFound {
        /// The product type queried.
        product_type: String,
        /// The requested source network.
        source_id: String,
    },

    /// Policy resolution produced an empty product list.
    #[error("no {product_type} products selected for source {selection}")]
    NoProducts {
        /// The product type queried.
        product_type: String,
        /// The source selection in effect.
        selection: String,
    },

    /// A property lookup failed.
    #[error("{owner}: {source}")]
    Property {
        /// What was queried (event id or product description).
        owner: String,
        /// The underlying lookup failure.
        source: PropertyError,
    },

    /// An unrecognized version policy was supplied.
    #[error(transparent)]
    InvalidPolicy(#[from] InvalidPolicy),

    /// A content pattern is not a valid regular expression.
    #[error("invalid content pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Compiler diagnostic.
        message: String,
    },

    /// A required document field is missing or out of range.
    #[error("event {event_id} has an invalid {field}")]
    InvalidDocument {
        /// The event being parsed.
        event_id: String,
        /// The offending field.
        field: &'static str,
        /// The property lookup that failed, when the field is a property.
        source: Option<PropertyError>,
    },

    /// The document is not valid JSON of the expected shape.
    #[error("failed to parse event document: {0}")]
    Parse(#[from] serde_json::Error),

    /// A cached document could not be read.
    #[error("failed to read event document {}: {source}", path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

impl ProductError {
    /// Whether this error means "no such data" rather than a caller bug or
    /// a corrupt document.
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::ProductTypeNotFound { .. }
            | Self::NoSubmissions { .. }
            | Self::SourceNotFound { .. }
            | Self::NoProducts { .. } => true,
            Self::Property { source, .. } => matches!(source, PropertyError::Missing { .. }),
            Self::InvalidPolicy(_)
            | Self::InvalidPattern { .. }
            | Self::InvalidDocument { .. }
            | Self::Parse(_)
            | Self::Io { .. } => false,
        }
    }
}
