//! # mcvisor
//!
//! **mcvisor** keeps a single Minecraft server process up to date, backed up and running.
//!
//! It wakes on a fixed interval, compares the remote version manifest with the one it
//! last applied, and when they differ it warns the players, stops the server, archives
//! the world, downloads the new server jar and starts it again. An interrupt at any wait
//! stops the server immediately and exits.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌────────────────┐   ┌────────────────┐   ┌────────────────┐
//!     │ ArtifactFetcher│   │    Archiver    │   │    Launcher    │
//!     │ (HttpFetcher)  │   │ (ZipArchiver)  │   │(CommandLauncher│
//!     └──────┬─────────┘   └──────┬─────────┘   └──────┬─────────┘
//!            ▼                    ▼                    ▼
//!     ┌────────────────┐   ┌────────────────┐   ┌────────────────┐
//!     │ VersionOracle  │   │ BackupManager  │   │ServerController│
//!     │ (stale check)  │   │ (world → zip)  │   │ (one process)  │
//!     └──────┬─────────┘   └──────┬─────────┘   └──────┬─────────┘
//!            └────────────────────┼────────────────────┘
//!                                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (update loop)                                         │
//! │  - SupervisorState (one at a time, only the loop changes it)      │
//! │  - CancellationToken (cancelled by ShutdownSignal)                │
//! │  - Bus (broadcast events)                                         │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   │ publish(Event)
//!                                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                    (capacity: Config::bus_capacity)               │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │   listener → emit()    │
//!                       │     SubscriberSet      │
//!                       └───┬────────────────┬───┘
//!                           ▼                ▼
//!                       LogWriter         custom
//!                    ([HH:MM:SS] ...)   subscribers
//! ```
//!
//! ### Lifecycle
//! ```text
//! loop {
//!   ├─► (after a sleep, if backup.on_wake) backup world
//!   ├─► oracle.check()
//!   │       ├─ up to date ─► nothing to do
//!   │       ├─ failed     ─► one VersionCheckFailed line
//!   │       └─ stale      ─► resolve version (abort if missing)
//!   │                        stop_graceful (if running):
//!   │                          say 5 min ─ 4m ─ say 1 min ─ 5s ─ say back ─ 1m
//!   │                          stop ─ 10s ─ kill ─ 10s
//!   │                        backup world (unless taken on wake)
//!   │                        fetch server.jar ─► persist versions.json
//!   ├─► start server (if not running)
//!   └─► sleep(interval)
//! }
//!
//! token cancelled at any wait or fetch ─► stop ─ 10s ─ kill ─ 10s ─► exit
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                         |
//! |-------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Supervision**   | The update/backup/restart loop and its shutdown path.         | [`Supervisor`], [`SupervisorState`]        |
//! | **Versions**      | Manifest staleness and channel resolution.                    | [`VersionOracle`], [`VersionManifest`]     |
//! | **Process**       | Launching, commanding and stopping the server.                | [`ServerController`], [`Launcher`]         |
//! | **Backups**       | Timestamped world archives.                                   | [`BackupManager`], [`Archiver`]            |
//! | **Policies**      | Stop timings and when to back up.                             | [`StopSchedule`], [`BackupPolicy`]         |
//! | **Subscriber API**| Hook into supervisor events (console, custom subscribers).    | [`Subscribe`], [`LogWriter`]               |
//! | **Errors**        | Typed errors with stable labels.                              | [`RuntimeError`], [`VersionError`], ...    |
//! | **Configuration** | TOML settings with defaults.                                  | [`Config`]                                 |
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use mcvisor::{Config, LogWriter, Subscribe, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = Config::default();
//!     cfg.interval_minutes = 30;
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::for_crate())];
//!     let sup = Supervisor::builder(cfg).with_subscribers(subs).build()?;
//!
//!     // Runs until SIGINT/SIGTERM, then stops the server and returns.
//!     sup.run().await?;
//!     Ok(())
//! }
//! ```
mod backup;
mod core;
mod error;
mod events;
mod fetch;
mod policies;
mod process;
mod subscribers;
mod version;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use backup::{Archiver, BackupManager, BackupOutcome, ZipArchiver, archive_name};
pub use crate::core::{Config, ShutdownSignal, Supervisor, SupervisorBuilder, SupervisorState};
pub use error::{
    BackupError, ConfigError, ControllerError, FetchError, Interrupted, RuntimeError,
    VersionError,
};
pub use events::{Bus, Event, EventKind};
pub use fetch::{ArtifactFetcher, HttpFetcher};
pub use policies::{BACKUP_NOTICE, BackupPolicy, Notice, STOP_COMMAND, StopSchedule, say};
pub use process::{CommandLauncher, LaunchSpec, Launcher, Platform, ServerController, ServerProcess};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use version::{Channel, OraclePaths, UpdateCheck, VersionManifest, VersionOracle};

/// Console tag, `mcvisor - <version>`, used in log lines and the terminal title.
pub fn console_tag() -> String {
    format!("{} - {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
