//! Version tracking: manifest model and staleness decisions.
//!
//! ## Contents
//! - [`Channel`], [`VersionManifest`] remote metadata and channel resolution
//! - [`VersionOracle`], [`UpdateCheck`] fetch-and-compare against the last applied manifest

mod manifest;
mod oracle;

pub use manifest::{Channel, VersionManifest};
pub use oracle::{OraclePaths, UpdateCheck, VersionOracle};
