//! Catalog download client.
//!
//! [`CatalogClient`] turns event ids into detail-document URLs, downloads
//! them through a [`Transport`] with a bounded number of attempts, and
//! resolves product content files for download. Every network failure ends
//! as a [`FetchOutcome::Failure`] or a `None`; nothing here panics or
//! propagates transport errors.

use comcat_products::{ContentMatch, EventRecord, Product, ProductError};
use tracing::{debug, info, warn};

use crate::cache::EventCache;
use crate::config::CatalogSection;
use crate::error::FetchError;
use crate::transport::{FetchOutcome, Transport};

/// A content file resolved from a product and the result of downloading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDownload {
    /// The content entry that was chosen.
    pub content: ContentMatch,
    /// The download result.
    pub outcome: FetchOutcome,
}

/// Downloads detail documents and content files from the catalog.
#[derive(Debug, Clone)]
pub struct CatalogClient<T> {
    transport: T,
    settings: CatalogSection,
}

impl<T: Transport> CatalogClient<T> {
    /// Create a client over `transport` using `settings` for URLs and
    /// attempt counts.
    pub const fn new(transport: T, settings: CatalogSection) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// The settings in use.
    pub const fn settings(&self) -> &CatalogSection {
        &self.settings
    }

    /// The underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Download `url`, retrying up to the configured attempt count.
    pub async fn fetch_url(&self, url: &str) -> FetchOutcome {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut last_reason = String::new();
        for attempt in 1..=max_attempts {
            match self.transport.get(url).await {
                FetchOutcome::Success(bytes) => {
                    debug!(url, attempt, bytes = bytes.len(), "download succeeded");
                    return FetchOutcome::Success(bytes);
                }
                FetchOutcome::Failure(reason) => {
                    warn!(url, attempt, max_attempts, reason = %reason, "download attempt failed");
                    last_reason = reason;
                }
            }
        }
        info!(url, max_attempts, "could not download from catalog");
        FetchOutcome::Failure(last_reason)
    }

    /// Download the raw detail document for `event_id`.
    pub async fn fetch_event_bytes(&self, event_id: &str) -> FetchOutcome {
        self.fetch_url(&self.settings.detail_url(event_id)).await
    }

    /// Download and parse the detail document for `event_id`.
    ///
    /// `None` means no usable data: the download failed or the body did not
    /// parse as an event.
    pub async fn fetch_event(&self, event_id: &str) -> Option<EventRecord> {
        let bytes = self.fetch_event_bytes(event_id).await.into_bytes()?;
        match EventRecord::from_slice(&bytes) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(event_id, error = %e, "downloaded event document is unusable");
                None
            }
        }
    }

    /// Download `event_id` and store it in `cache`.
    ///
    /// The body is parsed before it is written, so the cache never holds a
    /// document that cannot be loaded. `Ok(None)` means no data was
    /// available; `Err` is reserved for local cache failures.
    pub async fn fetch_into_cache(
        &self,
        cache: &EventCache,
        event_id: &str,
    ) -> Result<Option<EventRecord>, FetchError> {
        let Some(bytes) = self.fetch_event_bytes(event_id).await.into_bytes() else {
            return Ok(None);
        };
        let event = match EventRecord::from_slice(&bytes) {
            Ok(event) => event,
            Err(e) => {
                warn!(event_id, error = %e, "downloaded event document is unusable");
                return Ok(None);
            }
        };
        cache.store_event(event_id, &bytes)?;
        Ok(Some(event))
    }

    /// Download the shortest content file of `product` whose key matches
    /// `pattern`.
    ///
    /// `Ok(None)` means no content matched.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::InvalidPattern`] if `pattern` does not compile.
    pub async fn fetch_content(
        &self,
        product: &Product,
        pattern: &str,
    ) -> Result<Option<ContentDownload>, ProductError> {
        let Some(content) = product.shortest_matching_content(pattern)? else {
            info!(
                product_type = product.product_type(),
                source = product.source(),
                pattern,
                "no content matching pattern"
            );
            return Ok(None);
        };
        let outcome = self.fetch_url(&content.url).await;
        Ok(Some(ContentDownload { content, outcome }))
    }
}
