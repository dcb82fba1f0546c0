//! HTTP transport seam.
//!
//! [`Transport`] is the single point where bytes enter the system. The
//! production implementation wraps a `reqwest::Client` built by the caller
//! from configuration; tests substitute scripted transports.

use core::future::Future;

use crate::config::CatalogSection;
use crate::error::FetchError;

/// Result of one download: the body, or why there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response body.
    Success(Vec<u8>),
    /// Human-readable reason the download failed.
    Failure(String),
}

impl FetchOutcome {
    /// Whether the download produced a body.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The body, discarding any failure reason.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Self::Success(bytes) => Some(bytes),
            Self::Failure(_) => None,
        }
    }
}

/// Something that can GET a URL.
pub trait Transport: Send + Sync {
    /// Perform a single GET request. Implementations do not retry.
    fn get(&self, url: &str) -> impl Future<Output = FetchOutcome> + Send;
}

/// [`Transport`] over a caller-supplied `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Wrap an existing client.
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client with the configured timeout and user agent.
    pub fn from_config(config: &CatalogSection) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;
        Ok(Self::new(client))
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> FetchOutcome {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return FetchOutcome::Failure(format!("request failed: {e}")),
        };

        let status = response.status();
        if !status.is_success() {
            return FetchOutcome::Failure(format!("server returned {status}"));
        }

        match response.bytes().await {
            Ok(body) => FetchOutcome::Success(body.to_vec()),
            Err(e) => FetchOutcome::Failure(format!("failed to read response body: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_accessors() {
        let ok = FetchOutcome::Success(b"{}".to_vec());
        assert!(ok.is_success());
        assert_eq!(ok.into_bytes(), Some(b"{}".to_vec()));

        let failed = FetchOutcome::Failure("server returned 404 Not Found".to_owned());
        assert!(!failed.is_success());
        assert_eq!(failed.into_bytes(), None);
    }

    #[test]
    fn client_builds_from_defaults() {
        assert!(HttpTransport::from_config(&CatalogSection::default()).is_ok());
    }
}
