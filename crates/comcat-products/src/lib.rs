//! Product versioning and selection for catalog events.
//!
//! An event in the catalog carries, per product type, every submission made
//! by every contributing network. This crate decides which of those
//! submissions a caller should treat as authoritative.
//!
//! # Modules
//!
//! - [`event`] -- [`EventRecord`], the immutable parsed view of one event
//! - [`version`] -- [`VersionTable`], per-source chronological version numbers
//! - [`selector`] -- Source and version policy resolution into [`Product`]s
//! - [`product`] -- [`Product`] handles with property and content lookup
//! - [`content`] -- Content-file name derivation and end-anchored patterns
//! - [`error`] -- [`ProductError`]
//!
//! Every query recomputes from the immutable document, so an
//! [`EventRecord`] can be shared across threads without locking.

pub mod content;
pub mod error;
pub mod event;
pub mod product;
pub mod selector;
pub mod version;

pub use comcat_types::{SourceSelection, VersionPolicy};
pub use content::{ContentMatch, ContentPattern};
pub use error::ProductError;
pub use event::EventRecord;
pub use product::{Product, ProductSummary};
pub use selector::select;
pub use version::{VersionEntry, VersionTable};
