//! On-disk cache of detail documents and content files.
//!
//! Every cached file is gzip-compressed. Layout under the data directory:
//!
//! ```text
//! <data_dir>/<event_id>.geojson.gz          detail document
//! <data_dir>/<event_id>/<file name>.gz      downloaded content files
//! ```

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use comcat_products::content::file_name;
use comcat_products::{ContentMatch, EventRecord};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::{debug, info};

use crate::error::FetchError;

/// File extension of cached detail documents, before compression.
pub const EVENT_EXTENSION: &str = "geojson";

/// Suffix appended to every cached file.
pub const GZIP_EXTENSION: &str = "gz";

/// A data directory holding cached catalog files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCache {
    data_dir: PathBuf,
}

impl EventCache {
    /// Cache rooted at `data_dir`. The directory is created on first write.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Root directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Where the detail document for `event_id` lives.
    pub fn event_path(&self, event_id: &str) -> Result<PathBuf, FetchError> {
        validate_event_id(event_id)?;
        Ok(self
            .data_dir
            .join(format!("{event_id}.{EVENT_EXTENSION}.{GZIP_EXTENSION}")))
    }

    /// Whether a detail document for `event_id` is cached.
    pub fn contains_event(&self, event_id: &str) -> bool {
        self.event_path(event_id).is_ok_and(|path| path.is_file())
    }

    /// Compress and write a detail document, replacing any cached copy.
    pub fn store_event(&self, event_id: &str, bytes: &[u8]) -> Result<PathBuf, FetchError> {
        let path = self.event_path(event_id)?;
        write_gzip(&path, bytes)?;
        info!(event_id, path = %path.display(), bytes = bytes.len(), "event document cached");
        Ok(path)
    }

    /// Read a cached detail document. `Ok(None)` means nothing is cached.
    pub fn load_event(&self, event_id: &str) -> Result<Option<EventRecord>, FetchError> {
        let path = self.event_path(event_id)?;
        if !path.is_file() {
            debug!(event_id, path = %path.display(), "event document not cached");
            return Ok(None);
        }
        let bytes = read_gzip(&path)?;
        Ok(Some(EventRecord::from_slice(&bytes)?))
    }

    /// Where a content file downloaded from `url` for `event_id` lives.
    pub fn content_path(&self, event_id: &str, url: &str) -> Result<PathBuf, FetchError> {
        validate_event_id(event_id)?;
        let name = file_name(url);
        if name.is_empty() || name == "." || name == ".." {
            return Err(FetchError::InvalidContentName(url.to_owned()));
        }
        let suffix = format!(".{GZIP_EXTENSION}");
        let stored = if name.ends_with(&suffix) {
            name
        } else {
            name + &suffix
        };
        Ok(self.data_dir.join(event_id).join(stored))
    }

    /// Compress and write a downloaded content file.
    pub fn store_content(
        &self,
        event_id: &str,
        content: &ContentMatch,
        bytes: &[u8],
    ) -> Result<PathBuf, FetchError> {
        let path = self.content_path(event_id, &content.url)?;
        write_gzip(&path, bytes)?;
        info!(
            event_id,
            key = content.key,
            path = %path.display(),
            bytes = bytes.len(),
            "content file cached"
        );
        Ok(path)
    }

    /// Decompressed bytes of a cached content file. `Ok(None)` means the
    /// file has not been downloaded.
    pub fn load_content(&self, event_id: &str, url: &str) -> Result<Option<Vec<u8>>, FetchError> {
        let path = self.content_path(event_id, url)?;
        if !path.is_file() {
            return Ok(None);
        }
        read_gzip(&path).map(Some)
    }
}

/// Event ids become file names, so only catalog-style ids are accepted.
fn validate_event_id(event_id: &str) -> Result<(), FetchError> {
    let valid = !event_id.is_empty()
        && event_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(FetchError::InvalidEventId(event_id.to_owned()))
    }
}

fn write_gzip(path: &Path, bytes: &[u8]) -> Result<(), FetchError> {
    let cache_error = |source| FetchError::Cache {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(cache_error)?;
    }
    let file = File::create(path).map_err(cache_error)?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(bytes).map_err(cache_error)?;
    encoder.finish().map_err(cache_error)?;
    Ok(())
}

fn read_gzip(path: &Path) -> Result<Vec<u8>, FetchError> {
    let cache_error = |source| FetchError::Cache {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(cache_error)?;
    let mut bytes = Vec::new();
    GzDecoder::new(file)
        .read_to_end(&mut bytes)
        .map_err(cache_error)?;
    Ok(bytes)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "id": "nc72923380",
        "geometry": { "coordinates": [-122.3123, 38.2155, 11.12] },
        "properties": { "mag": 6.02, "time": 1408875644070, "products": {} }
    }"#;

    fn grid() -> ContentMatch {
        ContentMatch {
            key: "download/grid.xml".to_owned(),
            name: "grid.xml".to_owned(),
            url: "https://x.gov/shakemap/nc72923380/nc/1/download/grid.xml".to_owned(),
        }
    }

    #[test]
    fn event_paths() {
        let cache = EventCache::new("/data");
        assert_eq!(
            cache.event_path("nc72923380").unwrap(),
            PathBuf::from("/data/nc72923380.geojson.gz")
        );
        assert!(matches!(
            cache.event_path("../etc/passwd"),
            Err(FetchError::InvalidEventId(_))
        ));
        assert!(cache.event_path("").is_err());
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EventCache::new(dir.path().join("nested"));
        assert!(!cache.contains_event("nc72923380"));
        assert!(cache.load_event("nc72923380").unwrap().is_none());

        cache.store_event("nc72923380", DOCUMENT.as_bytes()).unwrap();
        assert!(cache.contains_event("nc72923380"));
        let event = cache.load_event("nc72923380").unwrap().unwrap();
        assert_eq!(event.id(), "nc72923380");
        assert!(event.product_types().is_empty());
    }

    #[test]
    fn stored_documents_are_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EventCache::new(dir.path());
        let path = cache.store_event("nc72923380", DOCUMENT.as_bytes()).unwrap();
        let raw = std::fs::read(path).unwrap();
        assert_eq!(raw.get(..2), Some(&[0x1f, 0x8b][..]));
    }

    #[test]
    fn reads_archives_written_by_other_tools() {
        let dir = tempfile::tempdir().unwrap();
        let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(DOCUMENT.as_bytes()).unwrap();
        std::fs::write(
            dir.path().join("nc72923380.geojson.gz"),
            encoder.finish().unwrap(),
        )
        .unwrap();

        let cache = EventCache::new(dir.path());
        let event = cache.load_event("nc72923380").unwrap().unwrap();
        assert!((event.magnitude().unwrap() - 6.02).abs() < 1e-9);
    }

    #[test]
    fn corrupt_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EventCache::new(dir.path());
        cache.store_event("us1000abcd", b"not json").unwrap();
        assert!(matches!(
            cache.load_event("us1000abcd"),
            Err(FetchError::Product(_))
        ));
    }

    #[test]
    fn uncompressed_file_is_a_cache_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("us1000abcd.geojson.gz"), DOCUMENT).unwrap();
        let cache = EventCache::new(dir.path());
        assert!(matches!(
            cache.load_event("us1000abcd"),
            Err(FetchError::Cache { .. })
        ));
    }

    #[test]
    fn content_files_go_under_the_event() {
        let dir = tempfile::tempdir().unwrap();
        let cache = EventCache::new(dir.path());
        let content = grid();
        assert!(cache.load_content("nc72923380", &content.url).unwrap().is_none());

        let path = cache.store_content("nc72923380", &content, b"<grid/>").unwrap();
        assert_eq!(path, dir.path().join("nc72923380").join("grid.xml.gz"));
        assert_eq!(
            cache.load_content("nc72923380", &content.url).unwrap().as_deref(),
            Some(&b"<grid/>"[..])
        );
    }

    #[test]
    fn compressed_downloads_are_not_double_suffixed() {
        let cache = EventCache::new("/data");
        assert_eq!(
            cache
                .content_path("nc72923380", "https://x.gov/download/stations.json.gz")
                .unwrap(),
            PathBuf::from("/data/nc72923380/stations.json.gz")
        );
    }

    #[test]
    fn content_url_without_file_name_is_rejected() {
        let cache = EventCache::new("/data");
        assert!(matches!(
            cache.content_path("nc72923380", "https://x.gov/download/"),
            Err(FetchError::InvalidContentName(_))
        ));
    }
}
