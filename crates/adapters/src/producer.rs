// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client for the delta producer: change-file discovery and body downloads.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use dsync_core::DeltaFile;
use futures_util::StreamExt;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Errors from producer operations
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("malformed response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Adapter for the producer side of the sync protocol
#[async_trait]
pub trait ProducerAdapter: Clone + Send + Sync + 'static {
    /// Change files created after `since`, in whatever order the producer sends them.
    async fn list_files(&self, since: DateTime<Utc>) -> Result<Vec<DeltaFile>, ProducerError>;

    /// Stream the body of file `id` to `dest`. A failed download leaves no
    /// partial file behind.
    async fn download(&self, id: &str, dest: &Path) -> Result<(), ProducerError>;
}

/// Producer endpoints
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub base_url: String,
    /// Discovery path, e.g. `/sync/files`
    pub files_path: String,
    /// Download path with an `:id` placeholder, e.g. `/files/:id/download`
    pub download_path: String,
    pub request_timeout: Duration,
}

impl ProducerConfig {
    fn files_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.files_path)
    }

    fn download_url(&self, id: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.download_path.replace(":id", id))
    }
}

#[derive(Deserialize)]
struct FileListing {
    data: Vec<FileResource>,
}

#[derive(Deserialize)]
struct FileResource {
    id: String,
    attributes: FileAttributes,
}

#[derive(Deserialize)]
struct FileAttributes {
    created: DateTime<Utc>,
    name: String,
}

/// [`ProducerAdapter`] over HTTP.
#[derive(Clone, Debug)]
pub struct HttpProducer {
    client: reqwest::Client,
    config: ProducerConfig,
}

impl HttpProducer {
    pub fn new(config: ProducerConfig) -> Result<Self, ProducerError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProducerError::Request {
                url: config.base_url.clone(),
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client, config })
    }

    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<reqwest::Response, ProducerError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProducerError::Request { url: url.to_string(), message: e.to_string() })?;
        if !response.status().is_success() {
            return Err(ProducerError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }

    async fn stream_to(&self, url: &str, dest: &Path) -> Result<(), ProducerError> {
        let response = self.get(url, &[]).await?;
        let io_err = |source| ProducerError::Io { path: dest.to_path_buf(), source };
        let mut file = tokio::fs::File::create(dest).await.map_err(io_err)?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| ProducerError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            file.write_all(&chunk).await.map_err(io_err)?;
        }
        file.flush().await.map_err(io_err)
    }
}

#[async_trait]
impl ProducerAdapter for HttpProducer {
    async fn list_files(&self, since: DateTime<Utc>) -> Result<Vec<DeltaFile>, ProducerError> {
        let url = self.config.files_url();
        let since = since.to_rfc3339_opts(SecondsFormat::AutoSi, true);
        let listing: FileListing = self
            .get(&url, &[("since", since)])
            .await?
            .json()
            .await
            .map_err(|e| ProducerError::Decode { url: url.clone(), message: e.to_string() })?;
        debug!(%url, count = listing.data.len(), "listed delta files");
        Ok(listing
            .data
            .into_iter()
            .map(|r| DeltaFile { id: r.id, created: r.attributes.created, name: r.attributes.name })
            .collect())
    }

    async fn download(&self, id: &str, dest: &Path) -> Result<(), ProducerError> {
        let url = self.config.download_url(id);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ProducerError::Io { path: parent.to_path_buf(), source })?;
        }
        let result = self.stream_to(&url, dest).await;
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(dest).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %dest.display(), error = %e, "failed to remove partial download");
                }
            }
        }
        result
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{ProducerAdapter, ProducerError};
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use dsync_core::DeltaFile;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;

    /// Recorded producer call
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum ProducerCall {
        ListFiles { since: DateTime<Utc> },
        Download { id: String, dest: PathBuf },
    }

    #[derive(Default)]
    struct FakeProducerState {
        files: Vec<DeltaFile>,
        bodies: HashMap<String, Vec<u8>>,
        download_failures: HashMap<String, u32>,
        list_fails: bool,
        calls: Vec<ProducerCall>,
    }

    /// Fake producer serving in-memory files
    #[derive(Clone, Default)]
    pub struct FakeProducerAdapter {
        inner: Arc<Mutex<FakeProducerState>>,
    }

    impl FakeProducerAdapter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Announce a delta file with the given body. Files are listed in
        /// the order they were published.
        pub fn publish(&self, file: DeltaFile, body: impl Into<Vec<u8>>) {
            let mut state = self.inner.lock();
            state.bodies.insert(file.id.clone(), body.into());
            state.files.push(file);
        }

        /// Serve a downloadable body without announcing it as a delta file.
        pub fn set_body(&self, id: &str, body: impl Into<Vec<u8>>) {
            self.inner.lock().bodies.insert(id.to_string(), body.into());
        }

        /// Fail the next `n` downloads of `id`.
        pub fn fail_downloads(&self, id: &str, n: u32) {
            self.inner.lock().download_failures.insert(id.to_string(), n);
        }

        pub fn fail_listing(&self, fail: bool) {
            self.inner.lock().list_fails = fail;
        }

        pub fn calls(&self) -> Vec<ProducerCall> {
            self.inner.lock().calls.clone()
        }

        pub fn download_count(&self, id: &str) -> usize {
            self.inner
                .lock()
                .calls
                .iter()
                .filter(|c| matches!(c, ProducerCall::Download { id: i, .. } if i == id))
                .count()
        }
    }

    #[async_trait]
    impl ProducerAdapter for FakeProducerAdapter {
        async fn list_files(&self, since: DateTime<Utc>) -> Result<Vec<DeltaFile>, ProducerError> {
            let mut state = self.inner.lock();
            state.calls.push(ProducerCall::ListFiles { since });
            if state.list_fails {
                return Err(ProducerError::Status { url: "fake://sync/files".into(), status: 503 });
            }
            Ok(state.files.iter().filter(|f| f.created > since).cloned().collect())
        }

        async fn download(&self, id: &str, dest: &Path) -> Result<(), ProducerError> {
            let body = {
                let mut state = self.inner.lock();
                state.calls.push(ProducerCall::Download { id: id.to_string(), dest: dest.to_path_buf() });
                if let Some(remaining) = state.download_failures.get_mut(id) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return Err(ProducerError::Status { url: format!("fake://files/{id}"), status: 500 });
                    }
                }
                state.bodies.get(id).cloned()
            };
            let body = body.ok_or_else(|| ProducerError::Status {
                url: format!("fake://files/{id}"),
                status: 404,
            })?;
            let io_err = |source| ProducerError::Io { path: dest.to_path_buf(), source };
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
            }
            tokio::fs::write(dest, body).await.map_err(io_err)
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProducerAdapter, ProducerCall};

#[cfg(test)]
#[path = "producer_tests.rs"]
mod tests;
