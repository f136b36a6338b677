//! # BackupManager: archives the world directory.
//!
//! ```text
//! backup(controller, tag):
//!   world dir absent?          ─► Skipped
//!   server running?            ─► say <BACKUP_NOTICE>   (best-effort)
//!   mkdir -p backups/
//!   archive (blocking pool)    ─► backups/<world>_<tag>_<UTC>.zip.part
//!   rename                     ─► backups/<world>_<tag>_<UTC>.zip
//! ```
//!
//! Errors are returned to the caller; the supervisor decides that they are never fatal.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::fs;

use crate::error::BackupError;
use crate::fetch::partial_path;
use crate::policies::{BACKUP_NOTICE, say};
use crate::process::ServerController;

use super::archiver::Archiver;

/// What a backup attempt did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackupOutcome {
    /// Archive written.
    Written { path: PathBuf, files: usize },
    /// Nothing to archive yet (world directory absent).
    Skipped { world_dir: PathBuf },
}

/// Archive file name: `<world>_<tag>_<YYYY-MM-DD_HH-MM-SS>.zip` (UTC).
pub fn archive_name(world: &str, tag: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}.zip",
        sanitize(world),
        sanitize(tag),
        at.format("%Y-%m-%d_%H-%M-%S")
    )
}

/// Keeps names portable across file systems.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Writes world backups into the backup directory.
pub struct BackupManager {
    archiver: Arc<dyn Archiver>,
    world_dir: PathBuf,
    world_name: String,
    backup_dir: PathBuf,
}

impl BackupManager {
    pub fn new(
        archiver: Arc<dyn Archiver>,
        world_dir: PathBuf,
        world_name: String,
        backup_dir: PathBuf,
    ) -> Self {
        Self {
            archiver,
            world_dir,
            world_name,
            backup_dir,
        }
    }

    /// Archives the world, tagging the file with `tag`.
    ///
    /// If the server is running, players are told first through `controller`.
    pub async fn backup(
        &self,
        controller: &mut ServerController,
        tag: &str,
    ) -> Result<BackupOutcome, BackupError> {
        if !fs::try_exists(&self.world_dir).await.unwrap_or(false) {
            return Ok(BackupOutcome::Skipped {
                world_dir: self.world_dir.clone(),
            });
        }
        if controller.is_running() {
            controller.notify(&say(BACKUP_NOTICE)).await;
        }

        fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(|source| BackupError::Io {
                path: self.backup_dir.clone(),
                source,
            })?;

        let dest = self
            .backup_dir
            .join(archive_name(&self.world_name, tag, Utc::now()));
        let part = partial_path(&dest);

        let archiver = Arc::clone(&self.archiver);
        let (src, prefix, target) = (
            self.world_dir.clone(),
            self.world_name.clone(),
            part.clone(),
        );
        let written = tokio::task::spawn_blocking(move || archiver.archive(&src, &prefix, &target))
            .await
            .map_err(|e| BackupError::Join(e.to_string()))
            .and_then(|r| r);

        let files = match written {
            Ok(files) => files,
            Err(e) => {
                let _ = fs::remove_file(&part).await;
                return Err(e);
            }
        };

        fs::rename(&part, &dest)
            .await
            .map_err(|source| BackupError::Io {
                path: dest.clone(),
                source,
            })?;
        Ok(BackupOutcome::Written { path: dest, files })
    }
}
