//! # Host platform.
//!
//! Resolved once at startup and injected into the launcher, so nothing else branches on
//! the host OS.

use crate::error::RuntimeError;

/// Host family the server is launched on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Unix,
}

impl Platform {
    /// Detects the host platform.
    ///
    /// Fails with [`RuntimeError::UnsupportedPlatform`] on anything that is neither Windows
    /// nor Unix.
    pub fn detect() -> Result<Self, RuntimeError> {
        if cfg!(windows) {
            Ok(Platform::Windows)
        } else if cfg!(unix) {
            Ok(Platform::Unix)
        } else {
            Err(RuntimeError::UnsupportedPlatform)
        }
    }

    /// Java executable used to run the server jar.
    pub fn java_program(&self) -> &'static str {
        match self {
            Platform::Windows => "java.exe",
            Platform::Unix => "java",
        }
    }

    /// Terminal escape that sets the console window title.
    ///
    /// Unix terminals take the OSC 2 sequence. On Windows the title is left alone and
    /// this returns `None`: the legacy console only retitles through the `title` shell
    /// builtin, and mcvisor does not spawn a shell just for that.
    pub fn title_sequence(&self, title: &str) -> Option<String> {
        match self {
            Platform::Unix => Some(format!("\x1b]2;{title}\x07")),
            Platform::Windows => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_current_host() {
        let p = Platform::detect().unwrap();
        if cfg!(unix) {
            assert_eq!(p, Platform::Unix);
            assert_eq!(p.java_program(), "java");
        }
    }

    #[test]
    fn unix_title_uses_osc_2() {
        assert_eq!(
            Platform::Unix.title_sequence("mcvisor").as_deref(),
            Some("\x1b]2;mcvisor\x07")
        );
        assert!(Platform::Windows.title_sequence("mcvisor").is_none());
    }
}
