//! # Cross-platform OS signal handling.
//!
//! Provides [`ShutdownSignal`]: listeners are registered up front (so a registration
//! failure is reported before the supervisor starts) and [`ShutdownSignal::recv`]
//! completes on the first termination signal.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd/Kubernetes)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::windows::ctrl_c`]

use std::io;

/// Registered termination signal listeners.
#[cfg(unix)]
pub struct ShutdownSignal {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
    sigquit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignal {
    /// Registers the listeners; fails if the OS refuses.
    pub fn register() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Completes when any termination signal is received.
    pub async fn recv(mut self) {
        tokio::select! {
            _ = self.sigint.recv()  => {},
            _ = self.sigterm.recv() => {},
            _ = self.sigquit.recv() => {},
        }
    }
}

/// Registered termination signal listeners.
#[cfg(windows)]
pub struct ShutdownSignal {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl ShutdownSignal {
    /// Registers the listener; fails if the OS refuses.
    pub fn register() -> io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    /// Completes when Ctrl-C is received.
    pub async fn recv(mut self) {
        let _ = self.ctrl_c.recv().await;
    }
}
