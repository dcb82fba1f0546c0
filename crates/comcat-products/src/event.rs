//! Immutable parsed view of one catalog event.
//!
//! An [`EventRecord`] is built once from a detail document and never
//! mutated. The origin time and coordinates are validated up front; the
//! magnitude may be absent. Product queries are answered on demand from the
//! raw submissions.

use std::collections::BTreeMap;
use std::path::Path;

use core::fmt;

use chrono::{DateTime, Utc};
use comcat_types::{
    EventDocument, PropertyError, PropertyMap, RawSubmission, SourceSelection, VersionPolicy,
    epoch_millis_to_utc,
};
use serde_json::Value;
use tracing::debug;

use crate::error::ProductError;
use crate::product::Product;
use crate::selector;
use crate::version::VersionTable;

/// One event from the catalog with all of its product submissions.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    id: String,
    time_millis: i64,
    time: DateTime<Utc>,
    longitude: f64,
    latitude: f64,
    depth: f64,
    magnitude: Option<f64>,
    properties: PropertyMap,
    products: BTreeMap<String, Vec<RawSubmission>>,
}

impl EventRecord {
    /// Build a record from a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InvalidDocument`] if the coordinates or the
    /// origin time are missing or unusable, or if a magnitude is present but
    /// not a number. A missing or `null` magnitude is accepted.
    pub fn from_document(document: EventDocument) -> Result<Self, ProductError> {
        let EventDocument {
            id,
            geometry,
            properties,
        } = document;
        let invalid = |field: &'static str, source: Option<PropertyError>| {
            ProductError::InvalidDocument {
                event_id: id.clone(),
                field,
                source,
            }
        };

        let longitude = geometry.longitude().ok_or_else(|| invalid("longitude", None))?;
        let latitude = geometry.latitude().ok_or_else(|| invalid("latitude", None))?;
        let depth = geometry.depth().ok_or_else(|| invalid("depth", None))?;
        let magnitude = properties
            .values
            .get_optional_f64("mag")
            .map_err(|e| invalid("mag", Some(e)))?;
        let time_millis = properties
            .values
            .get_i64("time")
            .map_err(|e| invalid("time", Some(e)))?;
        let time = epoch_millis_to_utc(time_millis).ok_or_else(|| invalid("time", None))?;

        Ok(Self {
            id,
            time_millis,
            time,
            longitude,
            latitude,
            depth,
            magnitude,
            properties: properties.values,
            products: properties.products,
        })
    }

    /// Parse a detail document from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ProductError> {
        Self::from_document(serde_json::from_str(json)?)
    }

    /// Parse a detail document from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ProductError> {
        Self::from_document(serde_json::from_slice(bytes)?)
    }

    /// Parse a detail document from an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self, ProductError> {
        Self::from_document(serde_json::from_value(value)?)
    }

    /// Read and parse a detail document stored on disk.
    pub fn load(path: &Path) -> Result<Self, ProductError> {
        let bytes = std::fs::read(path).map_err(|source| ProductError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let record = Self::from_slice(&bytes)?;
        debug!(
            event_id = record.id,
            path = %path.display(),
            product_types = record.products.len(),
            "event document loaded"
        );
        Ok(record)
    }

    /// Authoritative catalog event id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Origin time, exact to the millisecond.
    pub const fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// Origin time as stored, epoch milliseconds.
    pub const fn time_millis(&self) -> i64 {
        self.time_millis
    }

    /// Origin latitude in decimal degrees.
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Origin longitude in decimal degrees.
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Origin depth in kilometres.
    pub const fn depth(&self) -> f64 {
        self.depth
    }

    /// Authoritative magnitude, if the catalog has assigned one.
    pub const fn magnitude(&self) -> Option<f64> {
        self.magnitude
    }

    /// Human-readable region (`place`), if present.
    pub fn location(&self) -> Option<&str> {
        self.properties.get_str("place").ok()
    }

    /// Event page URL, if present.
    pub fn url(&self) -> Option<&str> {
        self.properties.get_str("url").ok()
    }

    /// Summary property keys in document order. `products` is not listed;
    /// submissions are reached through the product queries.
    pub fn properties(&self) -> Vec<&str> {
        self.properties.keys().collect()
    }

    /// The full summary property bag.
    pub const fn property_map(&self) -> &PropertyMap {
        &self.properties
    }

    /// Whether the summary properties carry `key`.
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains(key)
    }

    /// Raw value of a summary property.
    pub fn property(&self, key: &str) -> Result<&Value, ProductError> {
        self.properties
            .get(key)
            .map_err(|source| self.property_error(source))
    }

    /// Whether the event lists `product_type` at all.
    pub fn has_product(&self, product_type: &str) -> bool {
        self.products.contains_key(product_type)
    }

    /// Product types present, ascending.
    pub fn product_types(&self) -> Vec<&str> {
        self.products.keys().map(String::as_str).collect()
    }

    /// Number of submissions of `product_type`.
    pub fn product_count(&self, product_type: &str) -> Result<usize, ProductError> {
        self.submissions(product_type).map(<[RawSubmission]>::len)
    }

    /// Raw submissions of `product_type`, in document order.
    pub fn submissions(&self, product_type: &str) -> Result<&[RawSubmission], ProductError> {
        self.products
            .get(product_type)
            .map(Vec::as_slice)
            .ok_or_else(|| ProductError::ProductTypeNotFound {
                event_id: self.id.clone(),
                product_type: product_type.to_owned(),
            })
    }

    /// Per-source version numbering of `product_type`.
    pub fn version_table(&self, product_type: &str) -> Result<VersionTable, ProductError> {
        VersionTable::build(product_type, self.submissions(product_type)?)
    }

    /// Resolve products of `product_type` under the given policies.
    ///
    /// # Errors
    ///
    /// Fails with a not-found error if the type is absent or empty, if an
    /// explicit source contributed nothing, or if nothing was selected.
    pub fn products(
        &self,
        product_type: &str,
        sources: &SourceSelection,
        policy: VersionPolicy,
    ) -> Result<Vec<Product>, ProductError> {
        selector::select(product_type, self.submissions(product_type)?, sources, policy)
    }

    /// The single most authoritative product of `product_type`: the
    /// preferred version from the preferred source.
    pub fn preferred_product(&self, product_type: &str) -> Result<Product, ProductError> {
        self.products(product_type, &SourceSelection::Preferred, VersionPolicy::Preferred)?
            .into_iter()
            .next()
            .ok_or_else(|| ProductError::NoProducts {
                product_type: product_type.to_owned(),
                selection: SourceSelection::Preferred.to_string(),
            })
    }

    fn property_error(&self, source: PropertyError) -> ProductError {
        ProductError::Property {
            owner: format!("event {}", self.id),
            source,
        }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({:.3},{:.3}) {:.1} km ",
            self.id,
            self.time.format("%Y-%m-%d %H:%M:%S%.3f"),
            self.latitude,
            self.longitude,
            self.depth,
        )?;
        match self.magnitude {
            Some(magnitude) => write!(f, "M{magnitude:.1}"),
            None => f.write_str("M?"),
        }
    }
}
