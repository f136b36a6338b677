use std::path::Path;
use std::sync::Arc;

use crate::{
    backup::{Archiver, BackupManager, ZipArchiver},
    core::Config,
    error::RuntimeError,
    events::Bus,
    fetch::{ArtifactFetcher, HttpFetcher},
    policies::StopSchedule,
    process::{CommandLauncher, Launcher, Platform, ServerController},
    subscribers::{Subscribe, SubscriberSet},
    version::VersionOracle,
};

use super::supervisor::Supervisor;

/// Builder for constructing a Supervisor with optional collaborators.
///
/// Anything not supplied falls back to the production implementation: [`HttpFetcher`],
/// [`ZipArchiver`] and [`CommandLauncher`] for the detected [`Platform`].
pub struct SupervisorBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    fetcher: Option<Arc<dyn ArtifactFetcher>>,
    archiver: Option<Arc<dyn Archiver>>,
    launcher: Option<Arc<dyn Launcher>>,
    platform: Option<Platform>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            fetcher: None,
            archiver: None,
            launcher: None,
            platform: None,
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive supervisor events through dedicated workers with bounded
    /// queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Downloads through `fetcher` instead of HTTP.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn ArtifactFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Writes backups through `archiver` instead of zip.
    pub fn with_archiver(mut self, archiver: Arc<dyn Archiver>) -> Self {
        self.archiver = Some(archiver);
        self
    }

    /// Spawns the server through `launcher` instead of `java`.
    pub fn with_launcher(mut self, launcher: Arc<dyn Launcher>) -> Self {
        self.launcher = Some(launcher);
        self
    }

    /// Skips host detection.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Builds the Supervisor.
    ///
    /// Must be called from within a tokio runtime (subscriber workers and the event
    /// listener are spawned here). Fails if the host platform is unknown, a working
    /// directory cannot be created or the HTTP client cannot be built.
    pub fn build(self) -> Result<Supervisor, RuntimeError> {
        let cfg = self.cfg;
        let platform = match self.platform {
            Some(p) => p,
            None => Platform::detect()?,
        };

        ensure_dir(&cfg.work_dir)?;
        if cfg.backup.enabled {
            ensure_dir(&cfg.backup_dir())?;
        }

        let fetcher: Arc<dyn ArtifactFetcher> = match self.fetcher {
            Some(f) => f,
            None => Arc::new(
                HttpFetcher::new(cfg.fetch_timeout()).map_err(RuntimeError::HttpClient)?,
            ),
        };
        let archiver = self
            .archiver
            .unwrap_or_else(|| Arc::new(ZipArchiver::new()));
        let launcher = self
            .launcher
            .unwrap_or_else(|| Arc::new(CommandLauncher::new(platform)));

        let oracle = VersionOracle::new(
            Arc::clone(&fetcher),
            cfg.manifest_url.clone(),
            cfg.oracle_paths(),
        );
        let backups = BackupManager::new(
            archiver,
            cfg.world_dir(),
            cfg.world_name.clone(),
            cfg.backup_dir(),
        );
        let controller =
            ServerController::new(launcher, cfg.launch_spec(), StopSchedule::default());

        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers);

        Ok(Supervisor::new_internal(
            cfg, bus, subs, oracle, fetcher, backups, controller,
        ))
    }
}

fn ensure_dir(path: &Path) -> Result<(), RuntimeError> {
    std::fs::create_dir_all(path).map_err(|source| RuntimeError::Directory {
        path: path.to_path_buf(),
        source,
    })
}
