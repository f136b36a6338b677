//! # Operator console subscriber.
//!
//! [`LogWriter`] renders every supervisor event as one console line on stdout.
//!
//! ## Output format
//! ```text
//! [14:02:11] [mcvisor - 0.4.0]: Starting execution...
//! [14:02:11] [mcvisor - 0.4.0]: Checking to see if update is needed...
//! [14:02:12] [mcvisor - 0.4.0]: Update available: 17w43a
//! [14:02:12] [mcvisor - 0.4.0]: Server stopping...
//! [14:07:37] [mcvisor - 0.4.0]: Backup written to backups/world_17w43a_2017-10-25_12-07-37.zip
//! [14:07:40] [mcvisor - 0.4.0]: Updating server.jar, please wait...
//! [14:07:52] [mcvisor - 0.4.0]: Starting server...
//! [14:07:52] [mcvisor - 0.4.0]: Going to sleep for 60 minutes...
//! ```
//!
//! Timestamps are local wall-clock time taken from [`Event::at`], not from the moment
//! the worker gets around to printing.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::events::{Event, EventKind};

use super::Subscribe;

/// Console line subscriber.
pub struct LogWriter {
    tag: String,
}

impl LogWriter {
    /// Creates a writer whose lines carry `tag` (e.g. `"mcvisor - 0.4.0"`).
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// Writer tagged with this crate's name and version.
    pub fn for_crate() -> Self {
        Self::new(crate::console_tag())
    }

    /// Full console line for `event`, without trailing newline.
    pub fn format_line(&self, event: &Event) -> String {
        let at: DateTime<Local> = event.at.into();
        format!(
            "[{}] [{}]: {}",
            at.format("%H:%M:%S"),
            self.tag,
            message(event)
        )
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, event: &Event) {
        println!("{}", self.format_line(event));
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}

/// Message part of the console line.
fn message(e: &Event) -> String {
    let version = e.version.as_deref().unwrap_or("unknown");
    let reason = e.reason.as_deref().unwrap_or("unknown error");
    let path = e
        .path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    match e.kind {
        EventKind::SupervisorStarted => "Starting execution...".to_string(),
        EventKind::ShutdownRequested => "Shutdown requested.".to_string(),
        EventKind::SupervisorExiting => "Exiting...".to_string(),

        EventKind::VersionCheckStarted => "Checking to see if update is needed...".to_string(),
        EventKind::VersionCheckFailed => format!("Version check failed: {reason}"),
        EventKind::UpToDate => "Server already up to date. No update needed.".to_string(),
        EventKind::UpdateAvailable => format!("Update available: {version}"),
        EventKind::BinaryDownloading => "Updating server.jar, please wait...".to_string(),
        EventKind::BinaryFetched => format!("Downloaded server {version} to {path}"),
        EventKind::ManifestPersisted => format!("Server updated to {version}."),
        EventKind::UpdateAborted => format!("Update aborted, will retry on next wake: {reason}"),

        EventKind::BackupStarting => "Backing up the world...".to_string(),
        EventKind::BackupWritten => format!("Backup written to {path}"),
        EventKind::BackupSkipped => format!("No world at {path}, skipping backup."),
        EventKind::BackupFailed => format!("Backup failed, continuing: {reason}"),

        EventKind::ServerStarting => "Starting server...".to_string(),
        EventKind::ServerStarted => "Server started.".to_string(),
        EventKind::ServerStartFailed => format!("Server failed to start: {reason}"),
        EventKind::ServerStopping => "Server stopping...".to_string(),
        EventKind::ServerStopped => "Server stopped.".to_string(),
        EventKind::Sleeping => {
            let mins = e.delay().unwrap_or(Duration::ZERO).as_secs() / 60;
            format!("Going to sleep for {mins} minutes...")
        }
        EventKind::WakingUp => "Waking up to check for updates...".to_string(),
    }
}
