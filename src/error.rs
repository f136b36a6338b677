//! Error types used by the mcvisor runtime and its collaborators.
//!
//! - [`RuntimeError`]: environment problems the supervisor cannot work around (fatal).
//! - [`ConfigError`]: the configuration file could not be read or parsed (fatal).
//! - [`FetchError`]: an artifact download failed (transient).
//! - [`VersionError`]: the version check or manifest resolution failed (transient).
//! - [`BackupError`]: the world archive could not be written (always swallowed).
//! - [`ControllerError`]: the supervised process could not be launched or addressed.
//! - [`Interrupted`]: a wait lost the race against a shutdown request.
//!
//! Every enum provides `as_label` (stable snake_case label for logs).

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::version::Channel;

/// # Fatal errors of the supervisor runtime.
///
/// These represent environment misconfiguration; the binary exits non-zero.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Host OS is neither Windows nor a Unix flavour.
    #[error("unable to detect which OS this is running on")]
    UnsupportedPlatform,

    /// A required directory could not be created.
    #[error("cannot create directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// OS signal listeners could not be registered.
    #[error("cannot register shutdown signal handlers: {0}")]
    Signal(#[source] io::Error),

    /// HTTP client construction failed.
    #[error("cannot build http client: {0}")]
    HttpClient(#[source] FetchError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use mcvisor::RuntimeError;
    ///
    /// assert_eq!(RuntimeError::UnsupportedPlatform.as_label(), "runtime_unsupported_platform");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::UnsupportedPlatform => "runtime_unsupported_platform",
            RuntimeError::Directory { .. } => "runtime_directory",
            RuntimeError::Signal(_) => "runtime_signal",
            RuntimeError::HttpClient(_) => "runtime_http_client",
        }
    }
}

/// # Configuration loading errors.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::Read { .. } => "config_read",
            ConfigError::Parse { .. } => "config_parse",
        }
    }
}

/// # Artifact download errors.
///
/// A request that exceeds the client timeout surfaces as [`FetchError::Request`].
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("cannot write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub fn as_label(&self) -> &'static str {
        match self {
            FetchError::Client(_) => "fetch_client",
            FetchError::Request { .. } => "fetch_request",
            FetchError::Status { .. } => "fetch_status",
            FetchError::Io { .. } => "fetch_io",
        }
    }
}

/// # Version check errors.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum VersionError {
    /// Remote manifest could not be downloaded.
    #[error("cannot fetch version manifest: {0}")]
    Fetch(#[from] FetchError),

    /// Local manifest file could not be read or written.
    #[error("manifest file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Manifest is not valid JSON of the expected shape.
    #[error("malformed version manifest: {0}")]
    Parse(#[from] serde_json::Error),

    /// Manifest does not name a version for the configured channel.
    #[error("manifest has no latest {channel} version")]
    MissingVersion { channel: Channel },
}

impl VersionError {
    pub fn as_label(&self) -> &'static str {
        match self {
            VersionError::Fetch(_) => "version_fetch",
            VersionError::Io { .. } => "version_io",
            VersionError::Parse(_) => "version_parse",
            VersionError::MissingVersion { .. } => "version_missing",
        }
    }
}

/// # Backup errors.
///
/// Never fatal: the supervisor reports them and carries on with the update.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("backup io on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot walk world directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("cannot write archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("archive worker failed: {0}")]
    Join(String),
}

impl BackupError {
    pub fn as_label(&self) -> &'static str {
        match self {
            BackupError::Io { .. } => "backup_io",
            BackupError::Walk(_) => "backup_walk",
            BackupError::Zip(_) => "backup_zip",
            BackupError::Join(_) => "backup_join",
        }
    }
}

/// # Errors addressing the supervised process.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ControllerError {
    /// A command was addressed to a process that is not running.
    #[error("server is not running")]
    NotRunning,

    /// The server binary is not on disk yet.
    #[error("server binary {0:?} is missing")]
    BinaryMissing(PathBuf),

    /// The launcher could not spawn the process.
    #[error("cannot launch server: {0}")]
    Launch(#[source] io::Error),

    /// Writing to the process input stream failed.
    #[error("cannot write to server input: {0}")]
    Io(#[source] io::Error),
}

impl ControllerError {
    pub fn as_label(&self) -> &'static str {
        match self {
            ControllerError::NotRunning => "controller_not_running",
            ControllerError::BinaryMissing(_) => "controller_binary_missing",
            ControllerError::Launch(_) => "controller_launch",
            ControllerError::Io(_) => "controller_io",
        }
    }
}

/// A cancellable wait was cut short by a shutdown request.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("interrupted by shutdown request")]
pub struct Interrupted;
