//! # HTTP artifact fetcher.
//!
//! Streams the response body into `<dest>.part` and renames it over `dest` once the body is
//! complete, so an interrupted download never leaves a half-written binary behind.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::{fs, io::AsyncWriteExt};
use tracing::debug;

use crate::error::FetchError;

use super::ArtifactFetcher;

/// [`ArtifactFetcher`] backed by a shared [`reqwest::Client`].
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mcvisor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }
}

/// Returns the sibling temp path used while a download is in flight.
pub(crate) fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

#[async_trait]
impl ArtifactFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        debug!(url, dest = %dest.display(), "fetching artifact");

        let request_err = |source: reqwest::Error| FetchError::Request {
            url: url.to_string(),
            source,
        };
        let mut resp = self.client.get(url).send().await.map_err(request_err)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let part = partial_path(dest);
        let io_err = |source: std::io::Error| FetchError::Io {
            path: part.clone(),
            source,
        };

        let mut file = fs::File::create(&part).await.map_err(io_err)?;
        let written = async {
            while let Some(chunk) = resp.chunk().await.map_err(request_err)? {
                file.write_all(&chunk).await.map_err(io_err)?;
            }
            file.flush().await.map_err(io_err)?;
            file.sync_all().await.map_err(io_err)
        }
        .await;
        drop(file);

        if let Err(e) = written {
            let _ = fs::remove_file(&part).await;
            return Err(e);
        }

        fs::rename(&part, dest).await.map_err(|source| FetchError::Io {
            path: dest.to_path_buf(),
            source,
        })
    }
}
