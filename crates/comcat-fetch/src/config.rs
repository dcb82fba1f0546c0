//! Configuration for catalog downloads and the local cache.
//!
//! Settings come from an optional `comcat-config.yaml`. Every field has a
//! default, so a missing file or an empty document yields a working
//! configuration. Environment variables override the file:
//!
//! - `COMCAT_DETAIL_URL` -- overrides `catalog.detail_url_template`
//! - `COMCAT_TIMEOUT_SECS` -- overrides `catalog.timeout_secs`
//! - `COMCAT_DATA_DIR` -- overrides `cache.data_dir`

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Placeholder replaced by the event id in detail URL templates.
pub const EVENT_ID_PLACEHOLDER: &str = "[EVENTID]";

/// Detail-document endpoint of the public catalog feed.
pub const DEFAULT_DETAIL_URL_TEMPLATE: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/detail/[EVENTID].geojson";

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "comcat-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid config value for {key}: {message}")]
    Invalid {
        /// Dotted key or environment variable name.
        key: String,
        /// What is wrong with it.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CatalogConfig {
    /// Remote catalog settings.
    #[serde(default)]
    pub catalog: CatalogSection,

    /// Local cache settings.
    #[serde(default)]
    pub cache: CacheSection,
}

impl CatalogConfig {
    /// Load from `path` if it exists, otherwise start from defaults; then
    /// apply environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            serde_yml::from_str(&contents)?
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from a YAML string without consulting the environment.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process
    /// environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("COMCAT_DETAIL_URL") {
            self.catalog.detail_url_template = val;
        }
        if let Some(val) = lookup("COMCAT_TIMEOUT_SECS") {
            self.catalog.timeout_secs = val.trim().parse().map_err(|e| ConfigError::Invalid {
                key: "COMCAT_TIMEOUT_SECS".to_owned(),
                message: format!("{e}"),
            })?;
        }
        if let Some(val) = lookup("COMCAT_DATA_DIR") {
            self.cache.data_dir = PathBuf::from(val);
        }
        Ok(())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.catalog.detail_url_template.contains(EVENT_ID_PLACEHOLDER) {
            return Err(ConfigError::Invalid {
                key: "catalog.detail_url_template".to_owned(),
                message: format!("must contain {EVENT_ID_PLACEHOLDER}"),
            });
        }
        if self.catalog.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "catalog.timeout_secs".to_owned(),
                message: "must be at least 1".to_owned(),
            });
        }
        if self.catalog.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "catalog.max_attempts".to_owned(),
                message: "must be at least 1".to_owned(),
            });
        }
        Ok(())
    }
}

/// Remote catalog settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogSection {
    /// Detail-document URL with an `[EVENTID]` placeholder.
    #[serde(default = "default_detail_url_template")]
    pub detail_url_template: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per download, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl CatalogSection {
    /// Per-request timeout.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Detail-document URL for `event_id`.
    pub fn detail_url(&self, event_id: &str) -> String {
        self.detail_url_template.replace(EVENT_ID_PLACEHOLDER, event_id)
    }
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            detail_url_template: default_detail_url_template(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            user_agent: default_user_agent(),
        }
    }
}

/// Local cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheSection {
    /// Directory holding cached documents and content files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_detail_url_template() -> String {
    DEFAULT_DETAIL_URL_TEMPLATE.to_owned()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_attempts() -> u32 {
    2
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_owned()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.catalog.timeout(), Duration::from_secs(30));
        assert_eq!(config.catalog.max_attempts, 2);
        assert_eq!(config.catalog.user_agent, "Mozilla/5.0");
        assert_eq!(config.cache.data_dir, PathBuf::from("data"));
        assert!(config.validate().is_ok());
        assert_eq!(
            config.catalog.detail_url("nc72923380"),
            "https://earthquake.usgs.gov/earthquakes/feed/v1.0/detail/nc72923380.geojson"
        );
    }

    #[test]
    fn parse_partial_yaml() {
        let yaml = "catalog:\n  timeout_secs: 5\ncache:\n  data_dir: /tmp/comcat\n";
        let config = CatalogConfig::parse(yaml).unwrap();
        assert_eq!(config.catalog.timeout_secs, 5);
        assert_eq!(config.catalog.max_attempts, 2);
        assert_eq!(config.cache.data_dir, PathBuf::from("/tmp/comcat"));
    }

    #[test]
    fn parse_empty_yaml() {
        let config = CatalogConfig::parse("");
        assert!(config.is_ok());
    }

    #[test]
    fn rejects_template_without_placeholder() {
        let yaml = "catalog:\n  detail_url_template: https://example.org/detail.geojson\n";
        let err = CatalogConfig::parse(yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { ref key, .. } if key == "catalog.detail_url_template"
        ));
    }

    #[test]
    fn rejects_zero_attempts() {
        let err = CatalogConfig::parse("catalog:\n  max_attempts: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: BTreeMap<&str, &str> = [
            ("COMCAT_DATA_DIR", "/var/cache/comcat"),
            ("COMCAT_TIMEOUT_SECS", "12"),
            ("COMCAT_DETAIL_URL", "http://localhost:8080/[EVENTID].json"),
        ]
        .into_iter()
        .collect();
        let mut config = CatalogConfig::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| (*v).to_owned()))
            .unwrap();
        assert_eq!(config.cache.data_dir, PathBuf::from("/var/cache/comcat"));
        assert_eq!(config.catalog.timeout_secs, 12);
        assert_eq!(config.catalog.detail_url("ci1"), "http://localhost:8080/ci1.json");
    }

    #[test]
    fn bad_timeout_override_is_invalid() {
        let mut config = CatalogConfig::default();
        let err = config
            .apply_overrides(|name| (name == "COMCAT_TIMEOUT_SECS").then(|| "soon".to_owned()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { ref key, .. } if key == "COMCAT_TIMEOUT_SECS"
        ));
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CatalogConfig::load(&dir.path().join(DEFAULT_CONFIG_FILE));
        assert!(config.is_ok());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "catalog:\n  user_agent: comcat-tests\n").unwrap();
        let config = CatalogConfig::load(&path).unwrap();
        assert_eq!(config.catalog.user_agent, "comcat-tests");
    }
}
