//! Supervisor loop states.

use std::fmt;

/// Phase the supervisor loop is in; exactly one at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SupervisorState {
    /// Built, loop not entered yet.
    #[default]
    Idle,
    CheckingVersion,
    BackingUp,
    /// Downloading the binary and recording the manifest.
    Updating,
    Stopping,
    Starting,
    Sleeping,
    /// Interrupt honored; no further cycles run.
    ShuttingDown,
}

impl SupervisorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SupervisorState::Idle => "idle",
            SupervisorState::CheckingVersion => "checking_version",
            SupervisorState::BackingUp => "backing_up",
            SupervisorState::Updating => "updating",
            SupervisorState::Stopping => "stopping",
            SupervisorState::Starting => "starting",
            SupervisorState::Sleeping => "sleeping",
            SupervisorState::ShuttingDown => "shutting_down",
        }
    }
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
