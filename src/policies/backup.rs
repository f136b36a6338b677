//! # Backup policy.
//!
//! Decides **when** the world is archived; the archive itself is written by
//! [`BackupManager`](crate::backup::BackupManager).
//!
//! - `enabled`: master switch; nothing is archived when `false`.
//! - `on_wake`: archive every time the supervisor wakes from its interval sleep.
//! - `skip_update_backup_after_wake`: an update in the same cycle as a wake backup does
//!   not archive a second time.

use serde::Deserialize;

/// When to take world backups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackupPolicy {
    pub enabled: bool,
    pub on_wake: bool,
    pub skip_update_backup_after_wake: bool,
}

impl Default for BackupPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            on_wake: false,
            skip_update_backup_after_wake: true,
        }
    }
}

impl BackupPolicy {
    /// Whether a backup runs right after waking.
    #[inline]
    pub fn wake_backup_due(&self) -> bool {
        self.enabled && self.on_wake
    }

    /// Whether an update cycle archives the world before replacing the binary.
    #[inline]
    pub fn update_backup_due(&self, woke_backup_taken: bool) -> bool {
        self.enabled && !(woke_backup_taken && self.skip_update_backup_after_wake)
    }
}
