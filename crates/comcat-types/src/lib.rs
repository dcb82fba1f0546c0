//! Shared type definitions for the ComCat product crates.
//!
//! This crate models the detail document published by the earthquake
//! catalog for a single event, exactly as it arrives on the wire. It holds
//! no selection logic; `comcat-products` builds the queryable views on top
//! of these types.
//!
//! # Modules
//!
//! - [`document`] -- Event document, geometry, product submissions and
//!   their content files
//! - [`properties`] -- Open property bags with typed accessors
//! - [`selection`] -- Source and version selection policies
//! - [`time`] -- Lossless epoch-millisecond to UTC conversion

pub mod document;
pub mod properties;
pub mod selection;
pub mod time;

// Re-export all public types at crate root for convenience.
pub use document::{
    ContentFile, ContentMap, EventDocument, EventProperties, Geometry, RawSubmission,
};
pub use properties::{PropertyError, PropertyMap};
pub use selection::{InvalidPolicy, SourceSelection, VersionPolicy};
pub use time::epoch_millis_to_utc;
