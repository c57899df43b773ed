//! JSON data sources.
//!
//! The [`JsonSource`] trait abstracts over where day records come from (the
//! hosted `db/` folder over HTTP, or a local copy of it) so the store can be
//! tested without a network.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Failures of the retrieval collaborator.
///
/// These are not part of the view-model error taxonomy: callers log them and
/// treat the data as not having arrived.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {location}: {reason}")]
    Decode { location: String, reason: String },
}

/// Something that can hand back parsed JSON documents by relative path.
pub trait JsonSource {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch and parse `path`. When `cache_bust` is set the source must not
    /// serve a cached copy.
    fn fetch_json(&self, path: &str, cache_bust: bool) -> Result<Value, FetchError>;
}

/// Build the request URL, appending a `?{token}` query when busting caches.
pub fn request_url(url_root: &str, path: &str, cache_token: Option<i64>) -> String {
    match cache_token {
        Some(token) => format!("{url_root}{path}?{token}"),
        None => format!("{url_root}{path}"),
    }
}

/// Fetches documents from a web root with a blocking HTTP client.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    url_root: String,
}

impl HttpSource {
    pub fn new(url_root: impl Into<String>) -> Result<Self, FetchError> {
        let url_root = url_root.into();
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FetchError::Network {
                url: url_root.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, url_root })
    }
}

impl JsonSource for HttpSource {
    fn name(&self) -> &str {
        &self.url_root
    }

    fn fetch_json(&self, path: &str, cache_bust: bool) -> Result<Value, FetchError> {
        let token = cache_bust.then(|| chrono::Utc::now().timestamp_millis());
        let url = request_url(&self.url_root, path, token);
        log::debug!("GET {url}");

        let response = self
            .client
            .get(&url)
            .header("Content-Type", "application/json")
            .send()
            .map_err(|e| FetchError::Network {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.json::<Value>().map_err(|e| FetchError::Decode {
            location: url,
            reason: e.to_string(),
        })
    }
}

/// Reads documents from a local directory laid out like the hosted `db/`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
    label: String,
}

impl DirSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let label = root.display().to_string();
        Self { root, label }
    }
}

impl JsonSource for DirSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch_json(&self, path: &str, _cache_bust: bool) -> Result<Value, FetchError> {
        let full = self.root.join(path);
        let content = std::fs::read_to_string(&full).map_err(|source| FetchError::Io {
            path: full.clone(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| FetchError::Decode {
            location: full.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_busting_appends_token() {
        assert_eq!(
            request_url("https://host/db/", "index.json", Some(1626048000000)),
            "https://host/db/index.json?1626048000000"
        );
        assert_eq!(
            request_url("https://host/db/", "metrics.json", None),
            "https://host/db/metrics.json"
        );
    }

    #[test]
    fn dir_source_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.json"), "[2, 1, 0]").unwrap();
        let source = DirSource::new(dir.path());
        let value = source.fetch_json("index.json", true).unwrap();
        assert_eq!(value, serde_json::json!([2, 1, 0]));
    }

    #[test]
    fn dir_source_reports_missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.json"), "[2, 1,").unwrap();
        let source = DirSource::new(dir.path());
        assert!(matches!(
            source.fetch_json("missing.json", false),
            Err(FetchError::Io { .. })
        ));
        assert!(matches!(
            source.fetch_json("bad.json", false),
            Err(FetchError::Decode { .. })
        ));
    }
}
