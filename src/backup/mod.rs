//! World backups.
//!
//! ## Contents
//! - [`Archiver`], [`ZipArchiver`] directory-to-archive mechanics
//! - [`BackupManager`], [`BackupOutcome`] naming, placement and the player notice

mod archiver;
mod manager;

pub use archiver::{Archiver, ZipArchiver};
pub use manager::{BackupManager, BackupOutcome, archive_name};
