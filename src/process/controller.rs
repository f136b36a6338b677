//! # ServerController: sole owner of the supervised process.
//!
//! ```text
//!            start()                     stop_graceful(token) / stop_immediate()
//!  Stopped ───────────► Running ─────────────────────────────────────────────► Stopped
//!     ▲  (no-op if Running)  │  say 5min ─ wait ─ say 1min ─ wait ─ say back ─ wait   │
//!     │                      │  stop ─ grace ─ kill ─ cool-down                        │
//!     └──────────────────────┴─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - "running" is exactly "a process handle is held"; there is no separate flag to drift.
//! - At most one process exists: `start()` while running launches nothing.
//! - The warning waits race the shutdown token. Losing the race returns [`Interrupted`]
//!   with the process still running, so the caller can stop it immediately.
//! - Once `stop` has been sent the sequence always finishes: grace, kill, cool-down.
//! - Kill failures are logged; the handle is released either way.

use std::path::Path;
use std::sync::Arc;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::wait;
use crate::error::{ControllerError, Interrupted};
use crate::policies::{STOP_COMMAND, StopSchedule, say};

use super::launcher::{LaunchSpec, Launcher, ServerProcess};

/// Owns the lifecycle of the single supervised server process.
pub struct ServerController {
    launcher: Arc<dyn Launcher>,
    spec: LaunchSpec,
    schedule: StopSchedule,
    process: Option<Box<dyn ServerProcess>>,
}

impl ServerController {
    pub fn new(launcher: Arc<dyn Launcher>, spec: LaunchSpec, schedule: StopSchedule) -> Self {
        Self {
            launcher,
            spec,
            schedule,
            process: None,
        }
    }

    /// True while a server process is held.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }

    /// Launches the server unless it is already running.
    ///
    /// Returns `Ok(true)` if a process was launched, `Ok(false)` if one was already running.
    pub async fn start(&mut self) -> Result<bool, ControllerError> {
        if self.is_running() {
            return Ok(false);
        }
        if !binary_present(&self.spec.jar).await {
            return Err(ControllerError::BinaryMissing(self.spec.jar.clone()));
        }
        let process = self
            .launcher
            .launch(&self.spec)
            .await
            .map_err(ControllerError::Launch)?;
        debug!(pid = ?process.id(), "server launched");
        self.process = Some(process);
        Ok(true)
    }

    /// Sends one command line to the server.
    pub async fn send_command(&mut self, line: &str) -> Result<(), ControllerError> {
        let process = self.process.as_mut().ok_or(ControllerError::NotRunning)?;
        process.write_line(line).await.map_err(ControllerError::Io)
    }

    /// Warned shutdown: three broadcasts, then `stop`, grace, kill and cool-down.
    ///
    /// Returns `Ok(false)` if nothing was running, `Ok(true)` once the server is gone, and
    /// `Err(Interrupted)` if `token` fired during a warning wait (the server keeps running).
    pub async fn stop_graceful(&mut self, token: &CancellationToken) -> Result<bool, Interrupted> {
        if !self.is_running() {
            return Ok(false);
        }
        for notice in self.schedule.notices() {
            self.notify(&say(notice.text)).await;
            wait::pause(token, notice.then_wait).await?;
        }
        self.terminate().await;
        Ok(true)
    }

    /// Unwarned shutdown: `stop`, grace, kill and cool-down.
    ///
    /// Returns `false` if nothing was running.
    pub async fn stop_immediate(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.terminate().await;
        true
    }

    /// Best-effort command; failures are logged and ignored.
    pub(crate) async fn notify(&mut self, line: &str) {
        if let Err(e) = self.send_command(line).await {
            warn!(command = line, error = %e, "server command not delivered");
        }
    }

    async fn terminate(&mut self) {
        self.notify(STOP_COMMAND).await;
        time::sleep(self.schedule.grace).await;

        if let Some(mut process) = self.process.take() {
            if let Err(e) = process.kill().await {
                debug!(error = %e, "kill after grace failed; server likely exited already");
            }
        }
        time::sleep(self.schedule.cool_down).await;
    }
}

async fn binary_present(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeLauncher, ProcessLog};
    use std::path::PathBuf;
    use std::time::Duration;
    use tokio::time::Instant;

    fn controller(dir: &Path, launcher: &Arc<FakeLauncher>) -> ServerController {
        let jar = dir.join("server.jar");
        std::fs::write(&jar, b"jar").unwrap();
        ServerController::new(
            launcher.clone(),
            LaunchSpec {
                jar,
                min_memory_mb: 512,
                max_memory_mb: 512,
            },
            StopSchedule::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        let mut ctl = controller(dir.path(), &launcher);

        assert!(ctl.start().await.unwrap());
        assert!(!ctl.start().await.unwrap());
        assert_eq!(launcher.launches(), 1);
        assert!(ctl.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn start_without_binary_fails() {
        let launcher = Arc::new(FakeLauncher::new());
        let mut ctl = ServerController::new(
            launcher.clone(),
            LaunchSpec {
                jar: PathBuf::from("/nonexistent/server.jar"),
                min_memory_mb: 512,
                max_memory_mb: 512,
            },
            StopSchedule::default(),
        );
        assert!(matches!(
            ctl.start().await,
            Err(ControllerError::BinaryMissing(_))
        ));
        assert_eq!(launcher.launches(), 0);
        assert!(!ctl.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn launch_failure_keeps_controller_stopped() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        launcher.fail_launches(true);
        let mut ctl = controller(dir.path(), &launcher);

        assert!(matches!(ctl.start().await, Err(ControllerError::Launch(_))));
        assert!(!ctl.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn command_while_stopped_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        let mut ctl = controller(dir.path(), &launcher);

        assert!(matches!(
            ctl.send_command("say hi").await,
            Err(ControllerError::NotRunning)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_while_stopped_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        let mut ctl = controller(dir.path(), &launcher);
        let token = CancellationToken::new();

        let started = Instant::now();
        assert_eq!(ctl.stop_graceful(&token).await, Ok(false));
        assert!(!ctl.stop_immediate().await);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_stop_follows_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        let mut ctl = controller(dir.path(), &launcher);
        ctl.start().await.unwrap();
        let log: ProcessLog = launcher.last_process().unwrap();
        let token = CancellationToken::new();
        let t0 = Instant::now();

        assert_eq!(ctl.stop_graceful(&token).await, Ok(true));
        assert!(!ctl.is_running());
        assert_eq!(t0.elapsed(), Duration::from_secs(325));

        let lines = log.lines();
        let texts: Vec<&str> = lines.iter().map(|(_, l)| l.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "say The server is going down for update in 5 minutes!",
                "say The server is going down for update in 1 minute!",
                "say The server will be back up shortly.",
                "stop",
            ]
        );
        let offsets: Vec<u64> = lines
            .iter()
            .map(|(at, _)| at.duration_since(t0).as_secs())
            .collect();
        assert_eq!(offsets, vec![0, 240, 245, 305]);
        let killed = log.killed_at().unwrap();
        assert_eq!(killed.duration_since(t0), Duration::from_secs(315));
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_stop_kills_unresponsive_server() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        let mut ctl = controller(dir.path(), &launcher);
        ctl.start().await.unwrap();
        let log = launcher.last_process().unwrap();
        log.fail_writes(true);

        assert_eq!(ctl.stop_graceful(&CancellationToken::new()).await, Ok(true));
        assert!(log.killed_at().is_some());
        assert!(!ctl.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_during_first_warning_skips_remaining_notices() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        let mut ctl = controller(dir.path(), &launcher);
        ctl.start().await.unwrap();
        let log = launcher.last_process().unwrap();

        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(60)).await;
            trigger.cancel();
        });

        assert_eq!(ctl.stop_graceful(&token).await, Err(Interrupted));
        assert!(ctl.is_running());
        assert_eq!(log.lines().len(), 1);

        assert!(ctl.stop_immediate().await);
        let texts: Vec<String> = log.lines().into_iter().map(|(_, l)| l).collect();
        assert_eq!(texts.last().map(String::as_str), Some("stop"));
        assert_eq!(texts.len(), 2);
        assert!(log.killed_at().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_stop_waits_grace_then_cool_down() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        let mut ctl = controller(dir.path(), &launcher);
        ctl.start().await.unwrap();
        let log = launcher.last_process().unwrap();
        let t0 = Instant::now();

        assert!(ctl.stop_immediate().await);
        assert_eq!(t0.elapsed(), Duration::from_secs(20));
        assert_eq!(
            log.killed_at().unwrap().duration_since(t0),
            Duration::from_secs(10)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_stop_launches_again() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = Arc::new(FakeLauncher::new());
        let mut ctl = controller(dir.path(), &launcher);

        ctl.start().await.unwrap();
        ctl.stop_immediate().await;
        assert!(ctl.start().await.unwrap());
        assert_eq!(launcher.launches(), 2);
    }
}
