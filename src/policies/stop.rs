//! # Stop schedule for the supervised server.
//!
//! [`StopSchedule`] fixes the player-facing warning sequence and the termination timings:
//!
//! ```text
//! t=0s     say ... going down for update in 5 minutes!
//! t=240s   say ... going down for update in 1 minute!
//! t=245s   say ... will be back up shortly.
//! t=305s   stop
//! t=315s   kill (unconditional)
//! t=325s   return (cool-down elapsed)
//! ```
//!
//! The immediate variant skips the warnings and starts at `stop`.

use std::time::Duration;

/// Command asking the server to save and exit.
pub const STOP_COMMAND: &str = "stop";

/// Broadcast announcing a backup.
pub const BACKUP_NOTICE: &str = "Backing up the world, expect some lag...";

/// Builds a broadcast command carrying `text`.
pub fn say(text: &str) -> String {
    format!("say {text}")
}

/// One warning broadcast and the pause that follows it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Notice {
    pub text: &'static str,
    pub then_wait: Duration,
}

/// Timings of a warned shutdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StopSchedule {
    /// Pause after the five-minute warning.
    pub first_wait: Duration,
    /// Gap between the one-minute warning and the closing message.
    pub message_gap: Duration,
    /// Pause after the closing message, before `stop`.
    pub final_wait: Duration,
    /// Time the server gets to exit after `stop` before it is killed.
    pub grace: Duration,
    /// Pause after the kill, before anything may start again.
    pub cool_down: Duration,
}

impl Default for StopSchedule {
    fn default() -> Self {
        Self {
            first_wait: Duration::from_secs(240),
            message_gap: Duration::from_secs(5),
            final_wait: Duration::from_secs(60),
            grace: Duration::from_secs(10),
            cool_down: Duration::from_secs(10),
        }
    }
}

impl StopSchedule {
    /// Warning broadcasts in the order they are sent.
    pub fn notices(&self) -> [Notice; 3] {
        [
            Notice {
                text: "The server is going down for update in 5 minutes!",
                then_wait: self.first_wait,
            },
            Notice {
                text: "The server is going down for update in 1 minute!",
                then_wait: self.message_gap,
            },
            Notice {
                text: "The server will be back up shortly.",
                then_wait: self.final_wait,
            },
        ]
    }
}
