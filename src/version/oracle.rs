//! # VersionOracle: decides whether the local install is stale.
//!
//! ```text
//! check():
//!   fetch(manifest_url) ──► versions_new.json
//!   read versions.json  ──► absent?            ─► stale
//!                       ──► bytes differ?      ─► stale
//!   server.jar absent?                         ─► stale
//!   otherwise                                  ─► up to date
//!
//! persist(manifest):   (called by the supervisor after a successful update)
//!   write versions.json.part ──► rename ──► versions.json
//! ```
//!
//! The oracle never promotes the fetched manifest on its own, so an update that fails
//! half-way is retried on the next check.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;

use crate::error::VersionError;
use crate::fetch::ArtifactFetcher;

use super::manifest::VersionManifest;

/// Result of one version check.
#[derive(Clone, Debug)]
pub struct UpdateCheck {
    /// `true` if an update (or first install / binary repair) is required.
    pub stale: bool,
    /// Freshly fetched manifest.
    pub manifest: VersionManifest,
}

/// Local paths the oracle works with.
#[derive(Clone, Debug)]
pub struct OraclePaths {
    /// Last successfully applied manifest.
    pub persisted: PathBuf,
    /// Download target for the freshly fetched manifest.
    pub incoming: PathBuf,
    /// Supervised server binary.
    pub binary: PathBuf,
}

/// Compares the remote manifest against the last applied one.
pub struct VersionOracle {
    fetcher: Arc<dyn ArtifactFetcher>,
    manifest_url: String,
    paths: OraclePaths,
}

impl VersionOracle {
    pub fn new(fetcher: Arc<dyn ArtifactFetcher>, manifest_url: String, paths: OraclePaths) -> Self {
        Self {
            fetcher,
            manifest_url,
            paths,
        }
    }

    /// Fetches the remote manifest and reports whether the install is stale.
    pub async fn check(&self) -> Result<UpdateCheck, VersionError> {
        self.fetcher
            .fetch(&self.manifest_url, &self.paths.incoming)
            .await?;
        let fresh = read(&self.paths.incoming)
            .await?
            .ok_or_else(|| VersionError::Io {
                path: self.paths.incoming.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "fetched manifest vanished"),
            })?;

        let manifest_changed = match read(&self.paths.persisted).await? {
            None => true,
            Some(known) => known != fresh,
        };
        let binary_missing = !fs::try_exists(&self.paths.binary).await.unwrap_or(false);

        Ok(UpdateCheck {
            stale: manifest_changed || binary_missing,
            manifest: VersionManifest::from_bytes(fresh),
        })
    }

    /// Last successfully applied manifest, if any.
    pub async fn current(&self) -> Result<Option<VersionManifest>, VersionError> {
        Ok(read(&self.paths.persisted)
            .await?
            .map(VersionManifest::from_bytes))
    }

    /// Records `manifest` as the last applied one.
    pub async fn persist(&self, manifest: &VersionManifest) -> Result<(), VersionError> {
        let target = &self.paths.persisted;
        let part = crate::fetch::partial_path(target);

        fs::write(&part, manifest.as_bytes())
            .await
            .map_err(|source| VersionError::Io {
                path: part.clone(),
                source,
            })?;
        fs::rename(&part, target)
            .await
            .map_err(|source| VersionError::Io {
                path: target.clone(),
                source,
            })
    }
}

/// Reads a whole file, mapping "not found" to `None`.
async fn read(path: &Path) -> Result<Option<Vec<u8>>, VersionError> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(VersionError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFetcher;
    use crate::version::Channel;

    const A: &str = r#"{"latest":{"snapshot":"17w43a","release":"1.12.2"}}"#;
    const B: &str = r#"{"latest":{"snapshot":"17w43b","release":"1.12.2"}}"#;
    const URL: &str = "https://example.test/versions.json";

    fn oracle(dir: &Path, fetcher: &Arc<FakeFetcher>) -> VersionOracle {
        VersionOracle::new(
            fetcher.clone(),
            URL.to_string(),
            OraclePaths {
                persisted: dir.join("versions.json"),
                incoming: dir.join("versions_new.json"),
                binary: dir.join("server.jar"),
            },
        )
    }

    #[tokio::test]
    async fn first_run_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.serve(URL, A);

        let check = oracle(dir.path(), &fetcher).check().await.unwrap();
        assert!(check.stale);
        assert_eq!(check.manifest.resolve(Channel::Snapshot).unwrap(), "17w43a");
        assert!(!dir.path().join("versions.json").exists());
    }

    #[tokio::test]
    async fn identical_manifest_twice_is_not_stale() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("server.jar"), b"jar").unwrap();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.serve(URL, A);
        let oracle = oracle(dir.path(), &fetcher);

        let first = oracle.check().await.unwrap();
        assert!(first.stale);
        oracle.persist(&first.manifest).await.unwrap();

        let second = oracle.check().await.unwrap();
        assert!(!second.stale);
    }

    #[tokio::test]
    async fn missing_binary_forces_staleness() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("versions.json"), A).unwrap();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.serve(URL, A);

        assert!(oracle(dir.path(), &fetcher).check().await.unwrap().stale);
    }

    #[tokio::test]
    async fn changed_manifest_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("versions.json"), A).unwrap();
        std::fs::write(dir.path().join("server.jar"), b"jar").unwrap();
        let fetcher = Arc::new(FakeFetcher::new());
        fetcher.serve(URL, B);

        assert!(oracle(dir.path(), &fetcher).check().await.unwrap().stale);
    }

    #[tokio::test]
    async fn fetch_failure_leaves_persisted_manifest_alone() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("versions.json"), A).unwrap();
        let fetcher = Arc::new(FakeFetcher::new());

        let err = oracle(dir.path(), &fetcher).check().await.unwrap_err();
        assert!(matches!(err, VersionError::Fetch(_)));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("versions.json")).unwrap(),
            A
        );
    }

    #[tokio::test]
    async fn current_reads_persisted_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = Arc::new(FakeFetcher::new());
        let oracle = oracle(dir.path(), &fetcher);
        assert!(oracle.current().await.unwrap().is_none());

        oracle
            .persist(&VersionManifest::from_bytes(B))
            .await
            .unwrap();
        let current = oracle.current().await.unwrap().unwrap();
        assert_eq!(current.resolve(Channel::Snapshot).unwrap(), "17w43b");
        assert!(!dir.path().join("versions.json.part").exists());
    }
}
