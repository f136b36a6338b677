//! # Process launcher.
//!
//! [`Launcher`] spawns the server and hands back a [`ServerProcess`]: the only way to
//! talk to (or kill) the child. [`CommandLauncher`] runs `java -jar` through
//! [`tokio::process`]; the child inherits the supervisor's stdout/stderr so the server
//! console stays visible, and its stdin is piped for commands.

use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::debug;

use super::platform::Platform;

/// What to launch and with which memory bounds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Server jar; launched from its parent directory.
    pub jar: PathBuf,
    pub min_memory_mb: u32,
    pub max_memory_mb: u32,
}

impl LaunchSpec {
    /// JVM arguments, `-Xmx<max>m -Xms<min>m -jar <jar> nogui`.
    pub fn args(&self) -> Vec<String> {
        let jar = self
            .jar
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.jar.display().to_string());
        vec![
            format!("-Xmx{}m", self.max_memory_mb),
            format!("-Xms{}m", self.min_memory_mb),
            "-jar".to_string(),
            jar,
            "nogui".to_string(),
        ]
    }

    /// Directory the server runs in.
    pub fn work_dir(&self) -> PathBuf {
        match self.jar.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}

/// A running server with a writable input stream.
#[async_trait]
pub trait ServerProcess: Send + Sync + 'static {
    /// OS process id, if still known.
    fn id(&self) -> Option<u32>;

    /// Writes `line` plus a newline to the server input and flushes.
    async fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Forcibly terminates the server and reaps it.
    async fn kill(&mut self) -> io::Result<()>;
}

/// Spawns server processes.
#[async_trait]
pub trait Launcher: Send + Sync + 'static {
    async fn launch(&self, spec: &LaunchSpec) -> io::Result<Box<dyn ServerProcess>>;
}

/// [`Launcher`] that runs the jar with the host's java.
#[derive(Clone, Copy, Debug)]
pub struct CommandLauncher {
    platform: Platform,
}

impl CommandLauncher {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

#[async_trait]
impl Launcher for CommandLauncher {
    async fn launch(&self, spec: &LaunchSpec) -> io::Result<Box<dyn ServerProcess>> {
        let args = spec.args();
        debug!(program = self.platform.java_program(), ?args, "launching server");

        let mut child = Command::new(self.platform.java_program())
            .args(&args)
            .current_dir(spec.work_dir())
            .stdin(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("server stdin was not captured"))?;

        Ok(Box::new(ChildProcess { child, stdin }))
    }
}

struct ChildProcess {
    child: Child,
    stdin: ChildStdin,
}

#[async_trait]
impl ServerProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        let mut buf = String::with_capacity(line.len() + 1);
        buf.push_str(line);
        buf.push('\n');
        self.stdin.write_all(buf.as_bytes()).await?;
        self.stdin.flush().await
    }

    async fn kill(&mut self) -> io::Result<()> {
        self.child.kill().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(jar: &str) -> LaunchSpec {
        LaunchSpec {
            jar: PathBuf::from(jar),
            min_memory_mb: 1024,
            max_memory_mb: 2048,
        }
    }

    #[test]
    fn args_carry_memory_bounds() {
        assert_eq!(
            spec("/srv/mc/server.jar").args(),
            vec!["-Xmx2048m", "-Xms1024m", "-jar", "server.jar", "nogui"]
        );
    }

    #[test]
    fn work_dir_is_jar_parent() {
        assert_eq!(spec("/srv/mc/server.jar").work_dir(), PathBuf::from("/srv/mc"));
        assert_eq!(spec("server.jar").work_dir(), PathBuf::from("."));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn missing_program_fails_to_launch() {
        let launcher = CommandLauncher::new(Platform::Unix);
        let mut s = spec("server.jar");
        s.jar = PathBuf::from("/definitely/not/here/server.jar");
        assert!(launcher.launch(&s).await.is_err());
    }
}
