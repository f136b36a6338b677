//! # Runtime events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Supervisor events**: start, shutdown request, exit
//! - **Update events**: version check, update decision, binary download, manifest persistence
//! - **Backup events**: start, archive written, skipped, failed
//! - **Server events**: starting, started, stopping, stopped, start failure, sleep/wake
//!
//! The [`Event`] struct carries additional metadata such as timestamps, version
//! identifiers, archive paths, delays and failure reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use mcvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::UpdateAvailable).with_version("17w43a");
//!
//! assert_eq!(ev.kind, EventKind::UpdateAvailable);
//! assert_eq!(ev.version.as_deref(), Some("17w43a"));
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Supervisor events ===
    /// Supervisor loop entered.
    SupervisorStarted,

    /// Shutdown requested (OS signal observed or token cancelled).
    ShutdownRequested,

    /// Supervisor loop left; the process is about to exit.
    SupervisorExiting,

    // === Update events ===
    /// Version check is starting.
    VersionCheckStarted,

    /// The version check itself failed.
    ///
    /// Sets:
    /// - `reason`: failure message
    /// - `label`: stable error label
    VersionCheckFailed,

    /// Installed server matches the remote manifest.
    UpToDate,

    /// Install is stale; an update cycle begins.
    ///
    /// Sets:
    /// - `version`: resolved version identifier
    UpdateAvailable,

    /// Server binary download is starting.
    ///
    /// Sets:
    /// - `version`: version being downloaded
    BinaryDownloading,

    /// Server binary replaced on disk.
    ///
    /// Sets:
    /// - `version`, `path`
    BinaryFetched,

    /// Manifest recorded as applied; the update cycle is complete.
    ///
    /// Sets:
    /// - `version`
    ManifestPersisted,

    /// Update cycle aborted; the next wake retries.
    ///
    /// Sets:
    /// - `reason`: failed step and error
    /// - `label`: stable error label
    UpdateAborted,

    // === Backup events ===
    /// World backup is starting.
    BackupStarting,

    /// Backup archive written.
    ///
    /// Sets:
    /// - `path`: archive path
    BackupWritten,

    /// Nothing to back up.
    ///
    /// Sets:
    /// - `path`: world directory that was missing
    BackupSkipped,

    /// Backup failed; the cycle continues.
    ///
    /// Sets:
    /// - `reason`, `label`
    BackupFailed,

    // === Server events ===
    /// Server launch is starting.
    ServerStarting,

    /// Server launched.
    ServerStarted,

    /// Server launch failed; retried next wake.
    ///
    /// Sets:
    /// - `reason`, `label`
    ServerStartFailed,

    /// Server stop sequence is starting.
    ///
    /// Sets:
    /// - `reason`: `"graceful"` or `"immediate"`
    ServerStopping,

    /// Server process is gone.
    ServerStopped,

    /// Supervisor goes to sleep until the next check.
    ///
    /// Sets:
    /// - `delay_ms`: interval length
    Sleeping,

    /// Interval elapsed.
    WakingUp,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Version identifier, if applicable.
    pub version: Option<Arc<str>>,
    /// File or directory the event is about.
    pub path: Option<Arc<Path>>,
    /// Delay in milliseconds.
    pub delay_ms: Option<u64>,
    /// Human-readable reason (errors, stop kind).
    pub reason: Option<Arc<str>>,
    /// Stable snake_case label of the error behind a failure event.
    pub label: Option<&'static str>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            version: None,
            path: None,
            delay_ms: None,
            reason: None,
            label: None,
        }
    }

    /// Attaches a version identifier.
    #[inline]
    pub fn with_version(mut self, version: impl Into<Arc<str>>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Attaches a path.
    #[inline]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        self.path = Some(Arc::from(path));
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an error label.
    #[inline]
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Delay as a [`Duration`], if set.
    #[inline]
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(Duration::from_millis)
    }

    /// True for events that report a failed step.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            EventKind::VersionCheckFailed
                | EventKind::UpdateAborted
                | EventKind::BackupFailed
                | EventKind::ServerStartFailed
        )
    }
}
