//! External player - streamlink (or any compatible program)
//!
//! Spawns the player pointed at a stream URL and wraps the running child in
//! a [`PlaybackHandle`]. The player's standard streams are inherited and
//! never read or written.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Default player program
pub const DEFAULT_PLAYER: &str = "streamlink";
/// Default quality selector passed after the URL
pub const DEFAULT_QUALITY: &str = "best";

/// Errors from player operations
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Player '{0}' not found. Install it first.")]
    NotFound(String),
    #[error("Failed to start player: {0}")]
    StartFailed(#[from] io::Error),
}

/// How to invoke the player: `program [args...] <url> <quality>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerCommand {
    pub program: String,
    pub args: Vec<String>,
    pub quality: String,
}

impl Default for PlayerCommand {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYER)
    }
}

impl PlayerCommand {
    /// Player `program` at the default quality
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            quality: DEFAULT_QUALITY.to_string(),
        }
    }

    /// Extra arguments placed before the URL
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = quality.into();
        self
    }

    /// Full argument list for `url`
    pub fn args_for(&self, url: &str) -> Vec<String> {
        let mut args = self.args.clone();
        args.push(url.to_string());
        args.push(self.quality.clone());
        args
    }

    /// Check if the program is available on the system
    pub async fn is_available(&self) -> bool {
        // Paths are checked directly, bare names through PATH
        if self.program.contains(std::path::MAIN_SEPARATOR) {
            return std::path::Path::new(&self.program).exists();
        }

        Command::new("which")
            .arg(&self.program)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Start the player for `url`
    pub fn spawn(&self, url: &str) -> Result<PlaybackHandle, PlayerError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args_for(url));

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                PlayerError::NotFound(self.program.clone())
            } else {
                PlayerError::StartFailed(e)
            }
        })?;

        Ok(PlaybackHandle::new(child, url))
    }
}

/// A running player process and the URL it was launched for
#[derive(Debug)]
pub struct PlaybackHandle {
    child: Child,
    url: String,
    pid: Option<u32>,
    started: Instant,
}

impl PlaybackHandle {
    fn new(child: Child, url: &str) -> Self {
        let pid = child.id();
        Self {
            child,
            url: url.to_string(),
            pid,
            started: Instant::now(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Non-blocking exit check; `None` while the process runs
    pub fn try_status(&mut self) -> io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }

    /// Ask the player to exit, force-killing it only after `grace`
    pub async fn terminate(mut self, grace: Duration) -> Option<ExitStatus> {
        match self.child.try_wait() {
            Ok(Some(status)) => return Some(status),
            Ok(None) => {}
            Err(e) => {
                warn!(pid = ?self.pid, error = %e, "player status unknown, killing");
                let _ = self.child.kill().await;
                return None;
            }
        }

        if let Err(e) = send_term(&mut self.child) {
            debug!(pid = ?self.pid, error = %e, "SIGTERM failed");
        }

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                debug!(pid = ?self.pid, code = ?status.code(), "player exited");
                Some(status)
            }
            Ok(Err(e)) => {
                warn!(pid = ?self.pid, error = %e, "player wait error");
                None
            }
            Err(_) => {
                warn!(pid = ?self.pid, "player ignored SIGTERM, killing");
                let _ = self.child.kill().await;
                None
            }
        }
    }
}

#[cfg(unix)]
fn send_term(child: &mut Child) -> io::Result<()> {
    let Some(pid) = child.id() else {
        // Already reaped
        return Ok(());
    };

    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
fn send_term(child: &mut Child) -> io::Result<()> {
    child.start_kill()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let cmd = PlayerCommand::default();
        assert_eq!(cmd.program, "streamlink");
        assert_eq!(cmd.quality, "best");
        assert_eq!(
            cmd.args_for("http://x/stream.m3u8"),
            vec!["http://x/stream.m3u8", "best"]
        );
    }

    #[test]
    fn test_leading_args() {
        let cmd = PlayerCommand::new("streamlink")
            .with_args(["--player", "mpv"])
            .with_quality("720p");
        assert_eq!(
            cmd.args_for("http://a"),
            vec!["--player", "mpv", "http://a", "720p"]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_not_found() {
        let cmd = PlayerCommand::new("iptvwatch-no-such-player");
        assert!(!cmd.is_available().await);
        let err = cmd.spawn("http://a").unwrap_err();
        assert!(matches!(err, PlayerError::NotFound(ref p) if p == "iptvwatch-no-such-player"));
    }
}
