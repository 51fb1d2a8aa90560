use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use trip_core::model::{parse_document, parse_list, DocumentError};
use trip_core::DataLocation;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{path} not found")]
    NotFound { path: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("request for {url} failed: {message}")]
    Http { url: String, message: String },
}

/// Anything that stops a document from reaching a renderer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("{path}: {source}")]
    Document {
        path: String,
        #[source]
        source: DocumentError,
    },
}

/// Read access to the data root by relative path, e.g. `data_sleep.json`
/// or `day_details/day1.json`.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSource for DirSource {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let full = self.root.join(path);
        debug!(path = %full.display(), "reading document");
        tokio::fs::read_to_string(&full).await.map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                FetchError::NotFound {
                    path: path.to_string(),
                }
            } else {
                FetchError::Io {
                    path: path.to_string(),
                    source,
                }
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpSource {
    base: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let url = self.url(path);
        debug!(%url, "fetching document");
        let http_err = |err: reqwest::Error| FetchError::Http {
            url: url.clone(),
            message: err.to_string(),
        };
        let response = self.client.get(&url).send().await.map_err(http_err)?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(http_err)
    }
}

/// Keeps every successfully fetched body for the lifetime of the build.
/// Failures are not cached.
pub struct CachedSource {
    inner: Arc<dyn DocumentSource>,
    cache: Mutex<HashMap<String, String>>,
}

impl CachedSource {
    pub fn new(inner: Arc<dyn DocumentSource>) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached(&self) -> usize {
        self.cache.lock().len()
    }
}

#[async_trait]
impl DocumentSource for CachedSource {
    async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
        let hit = self.cache.lock().get(path).cloned();
        if let Some(body) = hit {
            return Ok(body);
        }
        let body = self.inner.fetch_text(path).await?;
        self.cache.lock().insert(path.to_string(), body.clone());
        Ok(body)
    }
}

/// The cached source for a configured data location.
pub fn source_for(location: &DataLocation) -> Arc<dyn DocumentSource> {
    let inner: Arc<dyn DocumentSource> = match location {
        DataLocation::Dir(dir) => Arc::new(DirSource::new(dir.clone())),
        DataLocation::Url(url) => Arc::new(HttpSource::new(url.clone())),
    };
    Arc::new(CachedSource::new(inner))
}

/// Fetch a document whose top level is an array.
pub async fn load_list(source: &dyn DocumentSource, path: &str) -> Result<Vec<Value>, LoadError> {
    let body = source.fetch_text(path).await?;
    parse_list(&body).map_err(|source| LoadError::Document {
        path: path.to_string(),
        source,
    })
}

pub async fn load_document<T: DeserializeOwned>(
    source: &dyn DocumentSource,
    path: &str,
) -> Result<T, LoadError> {
    let body = source.fetch_text(path).await?;
    parse_document(&body).map_err(|source| LoadError::Document {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use trip_core::model::TripInfo;

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DocumentSource for CountingSource {
        async fn fetch_text(&self, path: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if path == "missing.json" {
                return Err(FetchError::NotFound {
                    path: path.to_string(),
                });
            }
            Ok("[]".to_string())
        }
    }

    #[tokio::test]
    async fn dir_source_reads_nested_paths() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(dir.path().join("day_details")).expect("mkdir");
        std::fs::write(dir.path().join("day_details/day1.json"), "{}").expect("write");

        let source = DirSource::new(dir.path());
        let body = source
            .fetch_text("day_details/day1.json")
            .await
            .expect("read");
        assert_eq!(body, "{}");
    }

    #[tokio::test]
    async fn dir_source_reports_missing_files() {
        let dir = TempDir::new().expect("temp dir");
        let err = DirSource::new(dir.path())
            .fetch_text("data_sleep.json")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
        assert_eq!(err.to_string(), "data_sleep.json not found");
    }

    #[tokio::test]
    async fn cache_serves_repeat_reads_and_skips_failures() {
        let inner = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let cached = CachedSource::new(inner.clone());

        cached.fetch_text("a.json").await.expect("first");
        cached.fetch_text("a.json").await.expect("second");
        assert!(cached.fetch_text("missing.json").await.is_err());
        assert!(cached.fetch_text("missing.json").await.is_err());

        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
        assert_eq!(cached.cached(), 1);
    }

    #[tokio::test]
    async fn load_helpers_separate_fetch_and_parse_failures() {
        let dir = TempDir::new().expect("temp dir");
        std::fs::write(dir.path().join("data_task.json"), r#"{"not": "a list"}"#).expect("write");
        std::fs::write(
            dir.path().join("trip-info.json"),
            r#"{"startDate": "2025-01-01", "endDate": "2025-01-03"}"#,
        )
        .expect("write");
        let source = DirSource::new(dir.path());

        let err = load_list(&source, "data_task.json").await.unwrap_err();
        assert!(matches!(err, LoadError::Document { .. }));
        let err = load_list(&source, "data_todo.json").await.unwrap_err();
        assert!(matches!(err, LoadError::Fetch(FetchError::NotFound { .. })));

        let info: TripInfo = load_document(&source, "trip-info.json")
            .await
            .expect("trip info");
        assert_eq!(info.start_date, "2025-01-01");
    }

    #[test]
    fn http_source_joins_base_and_path() {
        let source = HttpSource::new("https://example.com/trip/data/");
        assert_eq!(
            source.url("day_details/day1.json"),
            "https://example.com/trip/data/day_details/day1.json"
        );
    }
}
