//! Resolved product handles.
//!
//! A [`Product`] owns a copy of one submission together with the version
//! number assigned to it by the [`VersionTable`](crate::VersionTable).
//! Handles are only produced by [`select`](crate::select) and never alias the
//! event they came from.

use core::fmt;

use chrono::{DateTime, Utc};
use comcat_types::{ContentFile, PropertyMap, RawSubmission, epoch_millis_to_utc};
use serde::Serialize;
use serde_json::Value;

use crate::content::{self, ContentMatch, ContentPattern};
use crate::error::ProductError;

/// One submission chosen by a selection policy.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    product_type: String,
    version: u32,
    submission: RawSubmission,
}

impl Product {
    pub(crate) fn new(product_type: &str, version: u32, submission: RawSubmission) -> Self {
        Self {
            product_type: product_type.to_owned(),
            version,
            submission,
        }
    }

    /// Product type (`origin`, `shakemap`, ...).
    pub fn product_type(&self) -> &str {
        &self.product_type
    }

    /// Version within the contributing source, starting at 1.
    pub const fn version(&self) -> u32 {
        self.version
    }

    /// Contributing source network.
    pub fn source(&self) -> &str {
        &self.submission.source
    }

    /// Catalog authority weight.
    pub const fn preferred_weight(&self) -> i64 {
        self.submission.preferred_weight
    }

    /// Catalog update time, epoch milliseconds.
    pub const fn update_time_millis(&self) -> i64 {
        self.submission.update_time
    }

    /// Catalog update time. `None` if the stored value is out of range.
    pub fn update_time(&self) -> Option<DateTime<Utc>> {
        epoch_millis_to_utc(self.submission.update_time)
    }

    /// Source-assigned product code.
    pub fn code(&self) -> Option<&str> {
        self.submission.code.as_deref()
    }

    /// Catalog status.
    pub fn status(&self) -> Option<&str> {
        self.submission.status.as_deref()
    }

    /// The backing submission.
    pub const fn submission(&self) -> &RawSubmission {
        &self.submission
    }

    /// Property keys in document order.
    pub fn properties(&self) -> Vec<&str> {
        self.submission.properties.keys().collect()
    }

    /// The full property bag.
    pub const fn property_map(&self) -> &PropertyMap {
        &self.submission.properties
    }

    /// Whether the product carries `key`.
    pub fn has_property(&self, key: &str) -> bool {
        self.submission.properties.contains(key)
    }

    /// Raw value of a property.
    pub fn property(&self, key: &str) -> Result<&Value, ProductError> {
        self.submission
            .properties
            .get(key)
            .map_err(|source| self.property_error(source))
    }

    /// Property as a string.
    pub fn property_str(&self, key: &str) -> Result<&str, ProductError> {
        self.submission
            .properties
            .get_str(key)
            .map_err(|source| self.property_error(source))
    }

    /// Property as a number; numeric strings are accepted.
    pub fn property_f64(&self, key: &str) -> Result<f64, ProductError> {
        self.submission
            .properties
            .get_f64(key)
            .map_err(|source| self.property_error(source))
    }

    /// Content keys in document order.
    pub fn contents(&self) -> Vec<&str> {
        self.submission.contents.keys().collect()
    }

    /// Content file for an exact key.
    pub fn content_file(&self, key: &str) -> Option<&ContentFile> {
        self.submission.contents.get(key)
    }

    /// File names (URL final segments) ending in a match for `pattern`, in
    /// document order.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InvalidPattern`] if `pattern` does not compile.
    /// A miss is an empty list.
    pub fn matching_contents(&self, pattern: &str) -> Result<Vec<String>, ProductError> {
        let pattern = ContentPattern::new(pattern)?;
        Ok(content::matching_names(&self.submission.contents, &pattern))
    }

    /// The entry whose key ends in a match for `pattern` and whose file name
    /// is shortest; the first listed wins on equal lengths.
    ///
    /// For contents `grid.xml` and `grid.xml.zip`, `grid\.xml.*` resolves
    /// to `grid.xml`.
    pub fn shortest_matching_content(
        &self,
        pattern: &str,
    ) -> Result<Option<ContentMatch>, ProductError> {
        let pattern = ContentPattern::new(pattern)?;
        Ok(content::shortest_match(&self.submission.contents, &pattern))
    }

    /// File name of [`shortest_matching_content`](Self::shortest_matching_content).
    pub fn content_name(&self, pattern: &str) -> Result<Option<String>, ProductError> {
        Ok(self.shortest_matching_content(pattern)?.map(|found| found.name))
    }

    /// URL of [`shortest_matching_content`](Self::shortest_matching_content).
    pub fn content_url(&self, pattern: &str) -> Result<Option<String>, ProductError> {
        Ok(self.shortest_matching_content(pattern)?.map(|found| found.url))
    }

    /// Serialisable overview of this product.
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            product_type: self.product_type.clone(),
            source: self.submission.source.clone(),
            version: self.version,
            preferred_weight: self.submission.preferred_weight,
            update_time: self.update_time(),
            code: self.submission.code.clone(),
            status: self.submission.status.clone(),
            properties: self.submission.properties.clone(),
            contents: self.contents().into_iter().map(ToOwned::to_owned).collect(),
        }
    }

    fn property_error(&self, source: comcat_types::PropertyError) -> ProductError {
        ProductError::Property {
            owner: format!("{} product from {}", self.product_type, self.submission.source),
            source,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Product {} v{} from {} updated ",
            self.product_type, self.version, self.submission.source
        )?;
        match self.update_time() {
            Some(time) => write!(f, "{}", time.format("%Y-%m-%d %H:%M:%S%.3f"))?,
            None => write!(f, "@{}ms", self.submission.update_time)?,
        }
        write!(
            f,
            " containing {} content files.",
            self.submission.contents.len()
        )
    }
}

/// Flat, serialisable view of a [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    /// Product type.
    pub product_type: String,
    /// Contributing source network.
    pub source: String,
    /// Version within the source.
    pub version: u32,
    /// Catalog authority weight.
    pub preferred_weight: i64,
    /// Catalog update time.
    pub update_time: Option<DateTime<Utc>>,
    /// Source-assigned product code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Catalog status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Product properties.
    pub properties: PropertyMap,
    /// Content keys in document order.
    pub contents: Vec<String>,
}
