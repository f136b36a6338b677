//! In-memory stand-ins for the collaborator traits, shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;

use crate::backup::Archiver;
use crate::error::{BackupError, FetchError};
use crate::fetch::ArtifactFetcher;
use crate::process::{LaunchSpec, Launcher, ServerProcess};

/// Serves fixed bodies per URL; anything else answers 404. Hung URLs never answer.
#[derive(Default)]
pub(crate) struct FakeFetcher {
    bodies: Mutex<HashMap<String, Vec<u8>>>,
    hung: Mutex<HashSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn serve(&self, url: &str, body: impl AsRef<[u8]>) {
        self.bodies
            .lock()
            .unwrap()
            .insert(url.to_string(), body.as_ref().to_vec());
    }

    /// Requests for `url` stay pending forever.
    pub(crate) fn hang(&self, url: &str) {
        self.hung.lock().unwrap().insert(url.to_string());
    }

    pub(crate) fn forget(&self, url: &str) {
        self.bodies.lock().unwrap().remove(url);
    }

    /// URLs requested so far, in order.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ArtifactFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        let hung = self.hung.lock().unwrap().contains(url);
        if hung {
            std::future::pending::<()>().await;
        }
        let body = self.bodies.lock().unwrap().get(url).cloned();
        match body {
            Some(body) => std::fs::write(dest, body).map_err(|source| FetchError::Io {
                path: dest.to_path_buf(),
                source,
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            }),
        }
    }
}

#[derive(Default)]
struct ProcessState {
    lines: Vec<(Instant, String)>,
    killed_at: Option<Instant>,
    fail_writes: bool,
}

/// What one fake server process received.
#[derive(Clone, Default)]
pub(crate) struct ProcessLog(Arc<Mutex<ProcessState>>);

impl ProcessLog {
    pub(crate) fn lines(&self) -> Vec<(Instant, String)> {
        self.0.lock().unwrap().lines.clone()
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.lines().into_iter().map(|(_, l)| l).collect()
    }

    pub(crate) fn killed_at(&self) -> Option<Instant> {
        self.0.lock().unwrap().killed_at
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.0.lock().unwrap().fail_writes = fail;
    }
}

struct FakeProcess {
    pid: u32,
    log: ProcessLog,
}

#[async_trait]
impl ServerProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.pid)
    }

    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut state = self.log.0.lock().unwrap();
        if state.fail_writes {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        state.lines.push((Instant::now(), line.to_string()));
        Ok(())
    }

    async fn kill(&mut self) -> io::Result<()> {
        let mut state = self.log.0.lock().unwrap();
        state.killed_at = Some(Instant::now());
        if state.fail_writes {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }
        Ok(())
    }
}

/// Hands out [`FakeProcess`]es and keeps their logs.
#[derive(Default)]
pub(crate) struct FakeLauncher {
    launches: AtomicUsize,
    next_pid: AtomicU32,
    fail: AtomicBool,
    processes: Mutex<Vec<ProcessLog>>,
}

impl FakeLauncher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_launches(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn last_process(&self) -> Option<ProcessLog> {
        self.processes.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    async fn launch(&self, _spec: &LaunchSpec) -> io::Result<Box<dyn ServerProcess>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        let log = ProcessLog::default();
        self.processes.lock().unwrap().push(log.clone());
        Ok(Box::new(FakeProcess {
            pid: 1000 + self.next_pid.fetch_add(1, Ordering::SeqCst),
            log,
        }))
    }
}

/// Leaves a half-written file behind and then fails.
pub(crate) struct FailingArchiver;

impl Archiver for FailingArchiver {
    fn archive(&self, _src: &Path, _prefix: &str, dest: &Path) -> Result<usize, BackupError> {
        std::fs::write(dest, b"PK\x03\x04 truncated").map_err(|source| BackupError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        Err(BackupError::Io {
            path: dest.to_path_buf(),
            source: io::Error::other("disk full"),
        })
    }
}
