//! Lifecycle policies.
//!
//! This module groups the knobs that control **how** the server is stopped and
//! **when** the world is backed up.
//!
//! ## Contents
//! - [`StopSchedule`] warning broadcasts, grace period and cool-down of a stop
//! - [`BackupPolicy`] whether backups run on update, on wake, or both
//!
//! ## Quick wiring
//! ```text
//! Config { backup: BackupPolicy, .. }     StopSchedule::default()
//!      └─► Supervisor decides when           └─► ServerController::stop_graceful
//!          BackupManager::backup runs             ServerController::stop_immediate
//! ```

mod backup;
mod stop;

pub use backup::BackupPolicy;
pub use stop::{BACKUP_NOTICE, Notice, STOP_COMMAND, StopSchedule, say};
