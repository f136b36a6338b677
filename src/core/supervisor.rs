//! # Supervisor: the update/backup/restart loop around one server process.
//!
//! The [`Supervisor`] owns the event bus, the collaborators and the
//! [`ServerController`]. It is the only code that changes [`SupervisorState`].
//!
//! ## Key responsibilities
//! - check the remote manifest on a fixed interval
//! - on a stale install: warn and stop the server, back up the world, download the new
//!   binary, record the manifest, start the server again
//! - publish one [`Event`] per transition; a listener fans them out via [`SubscriberSet`]
//! - honor OS termination signals with an immediate stop
//!
//! ## High-level architecture
//! ```text
//! run_until_cancelled():
//!
//!   ┌──────────────────────────────────────────────────────────────────────────┐
//!   │ [wake backup]  (after a sleep, if backup.on_wake)                        │
//!   │ CheckingVersion ── oracle.check() ──┬─ up to date ───────────────┐       │
//!   │                                     ├─ check failed ─────────────┤       │
//!   │                                     └─ stale ─► update():        │       │
//!   │                                          resolve(channel)        │       │
//!   │                                          Stopping (if running)   │       │
//!   │                                          BackingUp (if due)      │       │
//!   │                                          Updating: fetch jar     │       │
//!   │                                                    persist       │       │
//!   │ Starting (if not running) ◄──────────────────────────────────────┘       │
//!   │ Sleeping ── interval ─► loop                                             │
//!   └──────────────────────────────────┬───────────────────────────────────────┘
//!                                      │ token cancelled (any wait or fetch)
//!                                      ▼
//!                 ShuttingDown ── stop_immediate() ── SupervisorExiting
//!
//! Event flow:
//!   Supervisor ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                                                       ┌─────────┬─────────┐
//!                                                       ▼         ▼         ▼
//!                                                 [queue S1] [queue S2] ... [queue SN]
//!
//! Shutdown path:
//!   ShutdownSignal::recv()
//!             └─► token.cancel()
//!                   └─► the pending pause / fetch returns Interrupted
//!                         └─► stop_immediate(), SupervisorExiting, close()
//! ```
//!
//! ## Failure rules
//! - Version check, version resolution, binary download and manifest write failures end
//!   the update attempt with one event; the server keeps (or starts) running what is on
//!   disk and the next wake retries.
//! - Backup failures are reported and the update continues.
//! - Start failures are reported and retried on the next wake.
//! - Only cancellation ends the loop.
//! - A request that arrives during a step that cannot be raced (the post-`stop` grace
//!   and cool-down, a world archive) ends the cycle as soon as that step returns.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::backup::{BackupManager, BackupOutcome};
use crate::core::{Config, ShutdownSignal, SupervisorBuilder, SupervisorState, wait};
use crate::error::{Interrupted, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::fetch::ArtifactFetcher;
use crate::process::ServerController;
use crate::subscribers::SubscriberSet;
use crate::version::{VersionManifest, VersionOracle};

/// Tag used for backups taken before any version was installed.
const UNKNOWN_VERSION: &str = "unknown";

/// Drives the supervised server through check, update and restart cycles.
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    listener: Listener,
    oracle: VersionOracle,
    fetcher: Arc<dyn ArtifactFetcher>,
    backups: BackupManager,
    controller: ServerController,
    state: SupervisorState,
    installed: Option<String>,
    token: CancellationToken,
}

/// Background task forwarding bus events to the subscriber set.
struct Listener {
    done: CancellationToken,
    handle: JoinHandle<()>,
}

impl Listener {
    fn spawn(bus: &Bus, subs: SubscriberSet) -> Self {
        let mut rx = bus.subscribe();
        let done = CancellationToken::new();
        let stop = done.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    ev = rx.recv() => match ev {
                        Ok(ev) => subs.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "subscriber listener lagged behind the bus");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = stop.cancelled() => break,
                }
            }
            subs.shutdown().await;
        });
        Self { done, handle }
    }

    async fn close(self) {
        self.done.cancel();
        let _ = self.handle.await;
    }
}

impl Supervisor {
    /// Returns a builder for a supervisor using `cfg`.
    pub fn builder(cfg: Config) -> SupervisorBuilder {
        SupervisorBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: SubscriberSet,
        oracle: VersionOracle,
        fetcher: Arc<dyn ArtifactFetcher>,
        backups: BackupManager,
        controller: ServerController,
    ) -> Self {
        let listener = Listener::spawn(&bus, subs);
        Self {
            cfg,
            bus,
            listener,
            oracle,
            fetcher,
            backups,
            controller,
            state: SupervisorState::Idle,
            installed: None,
            token: CancellationToken::new(),
        }
    }

    /// Event bus; receivers see every event published after subscribing.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Token that ends the loop when cancelled.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Current loop state.
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Version of the installed server, as recorded by the last applied manifest.
    pub fn installed_version(&self) -> Option<&str> {
        self.installed.as_deref()
    }

    /// The supervised process.
    pub fn controller(&self) -> &ServerController {
        &self.controller
    }

    /// Runs until SIGINT/SIGTERM/SIGQUIT (Ctrl-C on Windows), then stops the server and
    /// flushes subscribers.
    pub async fn run(mut self) -> Result<(), RuntimeError> {
        let signal = ShutdownSignal::register().map_err(RuntimeError::Signal)?;
        let token = self.token.clone();
        let watcher = tokio::spawn(async move {
            signal.recv().await;
            token.cancel();
        });

        self.run_until_cancelled().await;
        watcher.abort();
        self.close().await;
        Ok(())
    }

    /// Runs cycles until [`shutdown_token`](Self::shutdown_token) is cancelled, then stops
    /// the server immediately.
    pub async fn run_until_cancelled(&mut self) {
        self.publish(Event::new(EventKind::SupervisorStarted));
        self.installed = self.installed_from_disk().await;

        let mut woke = false;
        loop {
            if self.cycle(woke).await.is_err() {
                break;
            }

            let interval = self.cfg.interval();
            self.set_state(SupervisorState::Sleeping);
            self.publish(Event::new(EventKind::Sleeping).with_delay(interval));
            if wait::pause(&self.token, interval).await.is_err() {
                break;
            }
            self.publish(Event::new(EventKind::WakingUp));
            woke = true;
        }

        self.shutdown().await;
    }

    /// Stops the event listener after it has forwarded everything published so far, and
    /// waits for subscribers to drain.
    pub async fn close(self) {
        self.listener.close().await;
    }

    /// One check cycle. `Err` means shutdown was requested.
    async fn cycle(&mut self, woke: bool) -> Result<(), Interrupted> {
        let policy = self.cfg.backup;
        let wake_backup_taken = woke && policy.wake_backup_due();
        if wake_backup_taken {
            self.backup_world().await;
            wait::live(&self.token)?;
        }

        self.set_state(SupervisorState::CheckingVersion);
        self.publish(Event::new(EventKind::VersionCheckStarted));
        match wait::interruptible(&self.token, self.oracle.check()).await? {
            Ok(check) if check.stale => self.update(check.manifest, wake_backup_taken).await?,
            Ok(_) => self.publish(Event::new(EventKind::UpToDate)),
            Err(e) => self.publish(
                Event::new(EventKind::VersionCheckFailed)
                    .with_reason(e.to_string())
                    .with_label(e.as_label()),
            ),
        }

        wait::live(&self.token)?;
        self.ensure_started().await;
        Ok(())
    }

    /// Replaces the installed server with the version named by `manifest`.
    async fn update(
        &mut self,
        manifest: VersionManifest,
        wake_backup_taken: bool,
    ) -> Result<(), Interrupted> {
        let version = match manifest.resolve(self.cfg.channel) {
            Ok(v) => v,
            Err(e) => {
                self.abort_update(format!("cannot resolve version: {e}"), e.as_label());
                return Ok(());
            }
        };
        self.publish(Event::new(EventKind::UpdateAvailable).with_version(version.as_str()));

        if self.controller.is_running() {
            self.set_state(SupervisorState::Stopping);
            self.publish(Event::new(EventKind::ServerStopping).with_reason("graceful"));
            self.controller.stop_graceful(&self.token).await?;
            self.publish(Event::new(EventKind::ServerStopped));
            wait::live(&self.token)?;
        }

        if self.cfg.backup.update_backup_due(wake_backup_taken) {
            self.backup_world().await;
            wait::live(&self.token)?;
        }

        self.set_state(SupervisorState::Updating);
        self.publish(Event::new(EventKind::BinaryDownloading).with_version(version.as_str()));
        let url = self.cfg.server_url(&version);
        let binary = self.cfg.binary_path();
        if let Err(e) = wait::interruptible(&self.token, self.fetcher.fetch(&url, &binary)).await? {
            self.abort_update(format!("cannot download {url}: {e}"), e.as_label());
            return Ok(());
        }
        self.publish(
            Event::new(EventKind::BinaryFetched)
                .with_version(version.as_str())
                .with_path(binary),
        );

        if let Err(e) = self.oracle.persist(&manifest).await {
            self.abort_update(format!("cannot record manifest: {e}"), e.as_label());
            return Ok(());
        }
        self.publish(Event::new(EventKind::ManifestPersisted).with_version(version.as_str()));
        self.installed = Some(version);
        Ok(())
    }

    /// Archives the world. Failures are reported and never propagate.
    async fn backup_world(&mut self) {
        self.set_state(SupervisorState::BackingUp);
        self.publish(Event::new(EventKind::BackupStarting));

        let tag = self.installed.as_deref().unwrap_or(UNKNOWN_VERSION).to_string();
        match self.backups.backup(&mut self.controller, &tag).await {
            Ok(BackupOutcome::Written { path, files }) => {
                debug!(files, path = %path.display(), "world archived");
                self.publish(Event::new(EventKind::BackupWritten).with_path(path));
            }
            Ok(BackupOutcome::Skipped { world_dir }) => {
                self.publish(Event::new(EventKind::BackupSkipped).with_path(world_dir));
            }
            Err(e) => self.publish(
                Event::new(EventKind::BackupFailed)
                    .with_reason(e.to_string())
                    .with_label(e.as_label()),
            ),
        }
    }

    async fn ensure_started(&mut self) {
        if self.controller.is_running() {
            return;
        }
        self.set_state(SupervisorState::Starting);
        self.publish(Event::new(EventKind::ServerStarting));
        match self.controller.start().await {
            Ok(_) => self.publish(Event::new(EventKind::ServerStarted)),
            Err(e) => self.publish(
                Event::new(EventKind::ServerStartFailed)
                    .with_reason(e.to_string())
                    .with_label(e.as_label()),
            ),
        }
    }

    async fn shutdown(&mut self) {
        self.set_state(SupervisorState::ShuttingDown);
        self.publish(Event::new(EventKind::ShutdownRequested));
        if self.controller.is_running() {
            self.publish(Event::new(EventKind::ServerStopping).with_reason("immediate"));
            self.controller.stop_immediate().await;
            self.publish(Event::new(EventKind::ServerStopped));
        }
        self.publish(Event::new(EventKind::SupervisorExiting));
    }

    /// Version named by the last applied manifest, if it can be read.
    async fn installed_from_disk(&self) -> Option<String> {
        match self.oracle.current().await {
            Ok(Some(manifest)) => manifest.resolve(self.cfg.channel).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "cannot read the applied manifest");
                None
            }
        }
    }

    fn abort_update(&self, reason: String, label: &'static str) {
        self.publish(
            Event::new(EventKind::UpdateAborted)
                .with_reason(reason)
                .with_label(label),
        );
    }

    fn set_state(&mut self, state: SupervisorState) {
        debug!(from = %self.state, to = %state, "state");
        self.state = state;
    }

    fn publish(&self, ev: Event) {
        self.bus.publish(ev);
    }
}
