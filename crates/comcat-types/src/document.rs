//! The catalog's per-event detail document.
//!
//! Shape (GeoJSON feature):
//!
//! ```text
//! {
//!   "id": "ci38457511",
//!   "geometry": { "coordinates": [lon, lat, depth] },
//!   "properties": {
//!     "mag": 7.1, "place": "...", "time": <epoch ms>, "url": "...",
//!     "products": {
//!       "<type>": [ { "source", "preferredWeight", "updateTime",
//!                     "properties": {...}, "contents": { key: { "url", ... } } } ]
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::properties::PropertyMap;

/// One event's detail document as published by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDocument {
    /// Authoritative catalog event id (e.g. `ci38457511`).
    pub id: String,
    /// Hypocentre geometry.
    pub geometry: Geometry,
    /// Summary properties plus the nested product submissions.
    pub properties: EventProperties,
}

/// GeoJSON point geometry of the authoritative origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// `[longitude, latitude, depth_km]`.
    pub coordinates: Vec<f64>,
}

impl Geometry {
    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.first().copied()
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.get(1).copied()
    }

    /// Depth in kilometres.
    pub fn depth(&self) -> Option<f64> {
        self.coordinates.get(2).copied()
    }
}

/// The `properties` object of an event document.
///
/// `products` is lifted out into a typed map; every other key stays in the
/// open [`PropertyMap`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventProperties {
    /// Product submissions grouped by product type (`origin`, `shakemap`, ...).
    #[serde(default)]
    pub products: BTreeMap<String, Vec<RawSubmission>>,
    /// All remaining summary properties (`mag`, `time`, `place`, `url`, ...).
    #[serde(flatten)]
    pub values: PropertyMap,
}

/// One contributor's submission of a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmission {
    /// Contributing network that produced this submission.
    pub source: String,
    /// Catalog authority weight. Higher is more authoritative.
    pub preferred_weight: i64,
    /// When the catalog received this submission, epoch milliseconds.
    pub update_time: i64,
    /// Catalog product id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Source-assigned product code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Product type name as repeated inside the submission.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    /// Catalog status (`UPDATE`, `DELETE`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Product-specific properties.
    #[serde(default)]
    pub properties: PropertyMap,
    /// Content files keyed by their in-product path.
    #[serde(default)]
    pub contents: ContentMap,
}

impl RawSubmission {
    /// A submission with no properties and no contents.
    pub fn new(source: impl Into<String>, preferred_weight: i64, update_time: i64) -> Self {
        Self {
            source: source.into(),
            preferred_weight,
            update_time,
            id: None,
            code: None,
            product_type: None,
            status: None,
            properties: PropertyMap::new(),
            contents: ContentMap::new(),
        }
    }

    /// Builder: add a property.
    #[must_use]
    pub fn with_property(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Builder: add a content file.
    #[must_use]
    pub fn with_content(mut self, key: impl Into<String>, file: ContentFile) -> Self {
        self.contents.insert(key, file);
        self
    }
}

/// A downloadable file attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFile {
    /// Absolute download URL.
    pub url: String,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Last modification, epoch milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
    /// Size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
}

impl ContentFile {
    /// A content file with only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: None,
            last_modified: None,
            length: None,
        }
    }
}

/// Content files in the order the document lists them.
///
/// Lookups that report "all matching files" return them in this order, so
/// the map never re-sorts its keys. A repeated key replaces the earlier
/// value in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentMap(IndexMap<String, ContentFile>);

impl ContentMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Insert a file, replacing any earlier entry with the same key.
    pub fn insert(&mut self, key: impl Into<String>, file: ContentFile) -> Option<ContentFile> {
        self.0.insert(key.into(), file)
    }

    /// File for an exact key.
    pub fn get(&self, key: &str) -> Option<&ContentFile> {
        self.0.get(key)
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContentFile)> {
        self.0.iter().map(|(key, file)| (key.as_str(), file))
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the product carries no files.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Two maps are equal only if they list the same entries in the same order.
impl PartialEq for ContentMap {
    fn eq(&self, other: &Self) -> bool {
        self.0.iter().eq(other.0.iter())
    }
}

impl Eq for ContentMap {}

impl FromIterator<(String, ContentFile)> for ContentMap {
    fn from_iter<I: IntoIterator<Item = (String, ContentFile)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
