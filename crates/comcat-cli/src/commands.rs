//! Subcommand implementations.
//!
//! Each command returns a serialisable report; `main` prints it as JSON.
//! Events are read from the cache first and downloaded only when missing.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use comcat_fetch::{CatalogClient, EventCache, FetchOutcome, Transport};
use comcat_products::{ContentMatch, EventRecord, ProductSummary, SourceSelection, VersionPolicy};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Cache plus download client, shared by every command.
#[derive(Debug)]
pub struct Session<T> {
    cache: EventCache,
    client: CatalogClient<T>,
}

/// Outcome of `comcat fetch`.
#[derive(Debug, Default, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    /// Ids whose detail documents are now cached.
    pub fetched: Vec<String>,
    /// Ids for which no data could be obtained.
    pub skipped: Vec<String>,
}

/// Outcome of `comcat info`.
#[derive(Debug, Serialize)]
pub struct EventInfo {
    /// One-line summary.
    pub summary: String,
    /// Event id.
    pub id: String,
    /// Origin time, RFC 3339.
    pub time: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Depth in kilometres.
    pub depth: f64,
    /// Magnitude, if the catalog has one.
    pub magnitude: Option<f64>,
    /// Region name.
    pub location: Option<String>,
    /// Event page.
    pub url: Option<String>,
    /// Submission count per product type.
    pub products: BTreeMap<String, usize>,
}

/// Outcome of `comcat content`.
#[derive(Debug, Serialize)]
pub struct ContentReport {
    /// The preferred product the lookup ran against.
    pub product: ProductSummary,
    /// Matching file names in document order.
    pub matching: Vec<String>,
    /// Shortest match, if any.
    pub shortest: Option<ContentMatch>,
    /// Where the shortest match was saved, when downloading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloaded: Option<PathBuf>,
}

impl<T: Transport> Session<T> {
    /// Bundle a cache and a client.
    pub const fn new(cache: EventCache, client: CatalogClient<T>) -> Self {
        Self { cache, client }
    }

    /// The cached event, downloading it first if needed.
    pub async fn event(&self, event_id: &str) -> Result<EventRecord> {
        if let Some(event) = self
            .cache
            .load_event(event_id)
            .with_context(|| format!("failed to read cached event {event_id}"))?
        {
            return Ok(event);
        }
        debug!(event_id, "event not cached, downloading");
        self.client
            .fetch_into_cache(&self.cache, event_id)
            .await
            .with_context(|| format!("failed to cache event {event_id}"))?
            .with_context(|| format!("no data available for event {event_id}"))
    }

    /// Download every id into the cache. A failure skips that id only.
    pub async fn fetch(&self, event_ids: &[String]) -> FetchReport {
        let mut report = FetchReport::default();
        for event_id in event_ids {
            match self.client.fetch_into_cache(&self.cache, event_id).await {
                Ok(Some(event)) => {
                    info!(event_id, summary = %event, "event fetched");
                    report.fetched.push(event_id.clone());
                }
                Ok(None) => {
                    warn!(event_id, "no data for event, skipping");
                    report.skipped.push(event_id.clone());
                }
                Err(e) => {
                    warn!(event_id, error = %e, "could not cache event, skipping");
                    report.skipped.push(event_id.clone());
                }
            }
        }
        report
    }

    /// Event summary with per-type submission counts.
    pub async fn info(&self, event_id: &str) -> Result<EventInfo> {
        let event = self.event(event_id).await?;
        let mut products = BTreeMap::new();
        for product_type in event.product_types() {
            products.insert(product_type.to_owned(), event.product_count(product_type)?);
        }
        Ok(EventInfo {
            summary: event.to_string(),
            id: event.id().to_owned(),
            time: event.time().to_rfc3339(),
            latitude: event.latitude(),
            longitude: event.longitude(),
            depth: event.depth(),
            magnitude: event.magnitude(),
            location: event.location().map(ToOwned::to_owned),
            url: event.url().map(ToOwned::to_owned),
            products,
        })
    }

    /// Products of one type under the given policies.
    pub async fn products(
        &self,
        event_id: &str,
        product_type: &str,
        sources: &SourceSelection,
        policy: VersionPolicy,
    ) -> Result<Vec<ProductSummary>> {
        let event = self.event(event_id).await?;
        let products = event
            .products(product_type, sources, policy)
            .with_context(|| {
                format!("event {event_id}: {sources} {product_type} products, {policy} versions")
            })?;
        Ok(products.iter().map(comcat_products::Product::summary).collect())
    }

    /// Content lookup against the preferred product of one type, with an
    /// optional download of the shortest match.
    pub async fn content(
        &self,
        event_id: &str,
        product_type: &str,
        pattern: &str,
        download: bool,
    ) -> Result<ContentReport> {
        let event = self.event(event_id).await?;
        let product = event
            .preferred_product(product_type)
            .with_context(|| format!("event {event_id}: preferred {product_type} product"))?;
        let matching = product.matching_contents(pattern)?;
        let shortest = product.shortest_matching_content(pattern)?;

        let mut report = ContentReport {
            product: product.summary(),
            matching,
            shortest,
            downloaded: None,
        };
        if !download {
            return Ok(report);
        }

        let Some(fetched) = self.client.fetch_content(&product, pattern).await? else {
            bail!("no {product_type} content of event {event_id} matches {pattern:?}");
        };
        match fetched.outcome {
            FetchOutcome::Success(bytes) => {
                let path = self.cache.store_content(event_id, &fetched.content, &bytes)?;
                report.downloaded = Some(path);
                Ok(report)
            }
            FetchOutcome::Failure(reason) => {
                bail!("could not download {}: {reason}", fetched.content.url)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use comcat_fetch::CatalogSection;

    use super::*;

    const RIDGECREST: &str =
        include_str!("../../comcat-products/tests/fixtures/ci38457511.geojson");

    /// Serves fixed bodies by URL; anything else is a 404.
    struct StaticTransport {
        bodies: BTreeMap<String, Vec<u8>>,
        requests: Mutex<Vec<String>>,
    }

    impl Transport for StaticTransport {
        async fn get(&self, url: &str) -> FetchOutcome {
            self.requests.lock().unwrap().push(url.to_owned());
            self.bodies.get(url).map_or_else(
                || FetchOutcome::Failure("server returned 404 Not Found".to_owned()),
                |body| FetchOutcome::Success(body.clone()),
            )
        }
    }

    fn session(dir: &std::path::Path, bodies: &[(&str, &[u8])]) -> Session<StaticTransport> {
        let settings = CatalogSection {
            detail_url_template: "http://catalog.test/[EVENTID].geojson".to_owned(),
            ..CatalogSection::default()
        };
        let transport = StaticTransport {
            bodies: bodies
                .iter()
                .map(|(url, body)| ((*url).to_owned(), body.to_vec()))
                .collect(),
            requests: Mutex::new(Vec::new()),
        };
        Session::new(EventCache::new(dir), CatalogClient::new(transport, settings))
    }

    fn ridgecrest_session(dir: &std::path::Path) -> Session<StaticTransport> {
        session(
            dir,
            &[
                ("http://catalog.test/ci38457511.geojson", RIDGECREST.as_bytes()),
                (
                    "https://earthquake.usgs.gov/archive/product/shakemap/ci38457511/ci/1562500000000/download/grid.xml",
                    b"<shakemap_grid/>",
                ),
            ],
        )
    }

    #[tokio::test]
    async fn fetch_skips_failures_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        let session = ridgecrest_session(dir.path());
        let ids = vec!["nc00000000".to_owned(), "ci38457511".to_owned()];
        let report = session.fetch(&ids).await;
        assert_eq!(report.fetched, vec!["ci38457511".to_owned()]);
        assert_eq!(report.skipped, vec!["nc00000000".to_owned()]);
        assert!(session.cache.contains_event("ci38457511"));
    }

    #[tokio::test]
    async fn info_downloads_once_then_reads_cache() {
        let dir = tempfile::tempdir().unwrap();
        let session = ridgecrest_session(dir.path());
        let info = session.info("ci38457511").await.unwrap();
        assert_eq!(info.location.as_deref(), Some("2km SSW of Searles Valley, CA"));
        assert_eq!(info.products.get("origin"), Some(&3));
        assert_eq!(info.products.get("phase-data"), Some(&0));

        session.info("ci38457511").await.unwrap();
        assert_eq!(session.client_requests(), 1);
    }

    #[tokio::test]
    async fn unknown_event_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = ridgecrest_session(dir.path());
        let err = session.info("us00000000").await.unwrap_err();
        assert!(err.to_string().contains("no data available"));
    }

    #[tokio::test]
    async fn products_all_sources_all_versions() {
        let dir = tempfile::tempdir().unwrap();
        let session = ridgecrest_session(dir.path());
        let summaries = session
            .products("ci38457511", "origin", &SourceSelection::All, VersionPolicy::All)
            .await
            .unwrap();
        let pairs: Vec<(&str, u32)> = summaries
            .iter()
            .map(|s| (s.source.as_str(), s.version))
            .collect();
        assert_eq!(pairs, vec![("ci", 1), ("ci", 2), ("us", 1)]);

        let err = session
            .products("ci38457511", "origin", &SourceSelection::source("nc"), VersionPolicy::All)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("event ci38457511"));
    }

    #[tokio::test]
    async fn content_lookup_and_download() {
        let dir = tempfile::tempdir().unwrap();
        let session = ridgecrest_session(dir.path());

        let report = session
            .content("ci38457511", "shakemap", r"grid\.xml.*", false)
            .await
            .unwrap();
        assert_eq!(report.matching, vec!["grid.xml.zip".to_owned(), "grid.xml".to_owned()]);
        assert_eq!(report.shortest.as_ref().map(|m| m.name.as_str()), Some("grid.xml"));
        assert!(report.downloaded.is_none());

        let report = session
            .content("ci38457511", "shakemap", r"grid\.xml.*", true)
            .await
            .unwrap();
        assert_eq!(
            report.downloaded,
            Some(dir.path().join("ci38457511").join("grid.xml.gz"))
        );
        let url = report.shortest.unwrap().url;
        assert_eq!(
            session.cache.load_content("ci38457511", &url).unwrap().as_deref(),
            Some(&b"<shakemap_grid/>"[..])
        );
    }

    #[tokio::test]
    async fn failed_content_download_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = ridgecrest_session(dir.path());
        let err = session
            .content("ci38457511", "shakemap", r"intensity\.jpg", true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("could not download"));

        let err = session
            .content("ci38457511", "shakemap", r"rupture\.json", true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("matches"));
    }

    impl Session<StaticTransport> {
        fn client_requests(&self) -> usize {
            self.client.transport().requests.lock().unwrap().len()
        }
    }
}
