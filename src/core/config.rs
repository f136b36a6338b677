//! # Supervisor configuration.
//!
//! Provides [`Config`], the centralized settings of the supervisor, loaded from an
//! optional TOML file. Every field has a default, so an empty file (or no file) is valid:
//!
//! ```toml
//! channel = "release"
//! interval_minutes = 30
//! max_memory_mb = 4096
//! work_dir = "/srv/minecraft"
//!
//! [backup]
//! on_wake = true
//! ```
//!
//! ## Path resolution
//! Relative `server_jar`, `backup_dir` and the world directory are resolved against
//! `work_dir`; the version manifests (`versions.json`, `versions_new.json`) always live
//! in `work_dir`.
//!
//! The stop timings are fixed policy ([`StopSchedule`](crate::StopSchedule)) and are not
//! configurable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::policies::BackupPolicy;
use crate::process::LaunchSpec;
use crate::version::{Channel, OraclePaths};

/// Placeholder substituted by [`Config::server_url`].
const VERSION_PLACEHOLDER: &str = "{version}";

const PERSISTED_MANIFEST: &str = "versions.json";
const INCOMING_MANIFEST: &str = "versions_new.json";

/// Settings for one supervised server.
///
/// ## Field semantics
/// - `channel`: which `latest` entry of the manifest is installed
/// - `interval_minutes`: sleep between update checks (`0` is clamped to one minute)
/// - `min_memory_mb` / `max_memory_mb`: JVM heap bounds
/// - `server_url_template`: download URL, `{version}` is substituted
/// - `fetch_timeout_secs`: per-request HTTP timeout (`0` is clamped to one second)
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub channel: Channel,
    pub interval_minutes: u64,
    pub min_memory_mb: u32,
    pub max_memory_mb: u32,
    pub work_dir: PathBuf,
    pub world_name: String,
    pub backup_dir: PathBuf,
    pub server_jar: PathBuf,
    pub manifest_url: String,
    pub server_url_template: String,
    pub fetch_timeout_secs: u64,
    pub bus_capacity: usize,
    pub backup: BackupPolicy,
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `channel = snapshot`, checked every `60` minutes
    /// - `2048` MB heap, server in the current directory as `server.jar`
    /// - world `world`, archives under `backups/`
    /// - official download locations, `120s` fetch timeout
    fn default() -> Self {
        Self {
            channel: Channel::Snapshot,
            interval_minutes: 60,
            min_memory_mb: 2048,
            max_memory_mb: 2048,
            work_dir: PathBuf::from("."),
            world_name: "world".to_string(),
            backup_dir: PathBuf::from("backups"),
            server_jar: PathBuf::from("server.jar"),
            manifest_url: "https://s3.amazonaws.com/Minecraft.Download/versions/versions.json"
                .to_string(),
            server_url_template: "https://s3.amazonaws.com/Minecraft.Download/versions/{version}/minecraft_server.{version}.jar"
                .to_string(),
            fetch_timeout_secs: 120,
            bus_capacity: 1024,
            backup: BackupPolicy::default(),
        }
    }
}

impl Config {
    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Sleep between update checks (at least one minute).
    #[inline]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_minutes.max(1).saturating_mul(60))
    }

    /// HTTP timeout per request (at least one second).
    #[inline]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.max(1))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Server jar location.
    pub fn binary_path(&self) -> PathBuf {
        self.resolve(&self.server_jar)
    }

    /// Manifest recorded after the last successful update.
    pub fn persisted_manifest_path(&self) -> PathBuf {
        self.work_dir.join(PERSISTED_MANIFEST)
    }

    /// Where each check downloads the remote manifest.
    pub fn incoming_manifest_path(&self) -> PathBuf {
        self.work_dir.join(INCOMING_MANIFEST)
    }

    /// World directory that gets archived.
    pub fn world_dir(&self) -> PathBuf {
        self.work_dir.join(&self.world_name)
    }

    /// Archive directory.
    pub fn backup_dir(&self) -> PathBuf {
        self.resolve(&self.backup_dir)
    }

    /// Download URL of the server binary for `version`.
    pub fn server_url(&self, version: &str) -> String {
        self.server_url_template.replace(VERSION_PLACEHOLDER, version)
    }

    /// Launch parameters for the server.
    pub fn launch_spec(&self) -> LaunchSpec {
        LaunchSpec {
            jar: self.binary_path(),
            min_memory_mb: self.min_memory_mb,
            max_memory_mb: self.max_memory_mb,
        }
    }

    /// File locations used by the version oracle.
    pub fn oracle_paths(&self) -> OraclePaths {
        OraclePaths {
            persisted: self.persisted_manifest_path(),
            incoming: self.incoming_manifest_path(),
            binary: self.binary_path(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.interval(), Duration::from_secs(3600));
        assert_eq!(cfg.fetch_timeout(), Duration::from_secs(120));
        assert!(cfg.backup.enabled);
        assert!(!cfg.backup.on_wake);
        assert!(cfg.backup.skip_update_backup_after_wake);
    }

    #[test]
    fn overrides_apply() {
        let cfg = Config::from_toml(
            r#"
            channel = "release"
            interval_minutes = 15
            max_memory_mb = 4096
            work_dir = "/srv/mc"
            backup_dir = "/var/backups/mc"

            [backup]
            on_wake = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.channel, Channel::Release);
        assert_eq!(cfg.interval(), Duration::from_secs(15 * 60));
        assert_eq!(cfg.max_memory_mb, 4096);
        assert_eq!(cfg.min_memory_mb, 2048);
        assert!(cfg.backup.on_wake);
        assert!(cfg.backup.enabled);
        assert_eq!(cfg.binary_path(), PathBuf::from("/srv/mc/server.jar"));
        assert_eq!(cfg.world_dir(), PathBuf::from("/srv/mc/world"));
        assert_eq!(cfg.backup_dir(), PathBuf::from("/var/backups/mc"));
        assert_eq!(
            cfg.persisted_manifest_path(),
            PathBuf::from("/srv/mc/versions.json")
        );
    }

    #[test]
    fn unknown_keys_and_bad_channel_are_rejected() {
        assert!(Config::from_toml("chanel = \"release\"").is_err());
        assert!(Config::from_toml("channel = \"nightly\"").is_err());
    }

    #[test]
    fn zero_values_are_clamped() {
        let cfg = Config::from_toml("interval_minutes = 0\nfetch_timeout_secs = 0\nbus_capacity = 0")
            .unwrap();
        assert_eq!(cfg.interval(), Duration::from_secs(60));
        assert_eq!(cfg.fetch_timeout(), Duration::from_secs(1));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn huge_interval_saturates() {
        let cfg = Config::from_toml(&format!("interval_minutes = {}", i64::MAX)).unwrap();
        assert_eq!(cfg.interval(), Duration::from_secs(u64::MAX));
    }

    #[test]
    fn server_url_substitutes_version() {
        let cfg = Config::default();
        assert_eq!(
            cfg.server_url("17w43a"),
            "https://s3.amazonaws.com/Minecraft.Download/versions/17w43a/minecraft_server.17w43a.jar"
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/mcvisor.toml")).unwrap_err();
        assert_eq!(err.as_label(), "config_read");
    }

    #[test]
    fn launch_spec_uses_memory_bounds() {
        let cfg = Config::from_toml("min_memory_mb = 512\nmax_memory_mb = 1024").unwrap();
        let spec = cfg.launch_spec();
        assert_eq!(spec.min_memory_mb, 512);
        assert_eq!(spec.max_memory_mb, 1024);
        assert_eq!(spec.jar, PathBuf::from("./server.jar"));
    }
}
