//! # Artifact download.
//!
//! [`ArtifactFetcher`] is the seam through which the supervisor downloads the version
//! manifest and the server binary. [`HttpFetcher`] is the production implementation.
//!
//! ## Contract
//! - `fetch(url, dest)` either leaves a complete file at `dest` or leaves `dest` untouched.
//! - Implementations bound the time a single fetch may take.

mod http;

use std::path::Path;

use async_trait::async_trait;

use crate::error::FetchError;

pub use http::HttpFetcher;
pub(crate) use http::partial_path;

/// Downloads a remote artifact to a local path.
#[async_trait]
pub trait ArtifactFetcher: Send + Sync + 'static {
    /// Downloads `url` into `dest`, replacing any existing file atomically.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError>;
}
