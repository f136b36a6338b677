//! # Version manifest and update channels.
//!
//! [`VersionManifest`] is an opaque snapshot of the remote version document. Staleness is
//! decided on the raw bytes; the only field ever interpreted is `latest.<channel>`:
//!
//! ```text
//! {
//!   "latest": { "snapshot": "17w43a", "release": "1.12.2" },
//!   "versions": [ ... ]
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// Update track selecting which `latest` field is authoritative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Weekly development builds.
    #[default]
    Snapshot,
    /// Stable releases.
    Release,
}

impl Channel {
    /// Returns the manifest key for this channel.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Snapshot => "snapshot",
            Channel::Release => "release",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
struct Document {
    latest: Latest,
}

#[derive(Deserialize)]
struct Latest {
    snapshot: Option<String>,
    release: Option<String>,
}

/// Raw remote version metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VersionManifest {
    raw: Vec<u8>,
}

impl VersionManifest {
    /// Wraps the raw manifest bytes.
    pub fn from_bytes(raw: impl Into<Vec<u8>>) -> Self {
        Self { raw: raw.into() }
    }

    /// Raw bytes as downloaded.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Resolves the version identifier published for `channel`.
    ///
    /// Fails with [`VersionError::MissingVersion`] when the field is absent or empty; the
    /// caller must not fall back to another channel.
    pub fn resolve(&self, channel: Channel) -> Result<String, VersionError> {
        let doc: Document = serde_json::from_slice(&self.raw)?;
        let version = match channel {
            Channel::Snapshot => doc.latest.snapshot,
            Channel::Release => doc.latest.release,
        };
        version
            .filter(|v| !v.trim().is_empty())
            .ok_or(VersionError::MissingVersion { channel })
    }
}
