//! Playback supervision
//!
//! Keeps exactly one player process alive for a stream URL. Liveness is
//! polled from the process exit status on a fixed interval; a dead player
//! is terminated (if needed) and launched again.
//!
//! ```text
//!   Idle ──launch──▶ Running ──dead──▶ Restarting ──launch──▶ Running
//!                       │                   │
//!                       │ clean exit,       │ too many failed
//!                       ▼ no restart        ▼ launches
//!                   Finished              GaveUp
//! ```

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use super::player::{PlaybackHandle, PlayerCommand, PlayerError};

/// Supervisor lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// No player process
    Idle,
    /// Player launched and believed live
    Running,
    /// Old player being stopped, new one being started
    Restarting,
    /// Player exited cleanly and the policy says stop
    Finished,
    /// Too many consecutive launch failures
    GaveUp,
}

impl SupervisorState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SupervisorState::Finished | SupervisorState::GaveUp)
    }
}

/// When and how often to restart the player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Time between liveness checks
    pub poll_interval: Duration,
    /// Restart even when the player exits with status 0
    pub restart_on_clean_exit: bool,
    /// Stop after this many launches fail in a row (`None` = never)
    pub max_consecutive_failures: Option<u32>,
    /// How long a terminated player gets before being killed
    pub termination_grace: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            restart_on_clean_exit: true,
            max_consecutive_failures: None,
            termination_grace: Duration::from_secs(5),
        }
    }
}

/// Result of one supervision step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Alive,
    Restarted,
    LaunchFailed,
    Finished,
    GaveUp,
}

/// Ways a supervision run ends other than shutdown
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Giving up after {failures} failed attempts to start the player: {last}")]
    GaveUp { failures: u32, last: PlayerError },
}

/// Owner of the single player process
pub struct Supervisor {
    command: PlayerCommand,
    policy: RestartPolicy,
    handle: Option<PlaybackHandle>,
    state: SupervisorState,
    failures: u32,
    last_error: Option<PlayerError>,
    restarts: u32,
}

impl Supervisor {
    pub fn new(command: PlayerCommand, policy: RestartPolicy) -> Self {
        Self {
            command,
            policy,
            handle: None,
            state: SupervisorState::Idle,
            failures: 0,
            last_error: None,
            restarts: 0,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn handle(&self) -> Option<&PlaybackHandle> {
        self.handle.as_ref()
    }

    /// Number of restarts performed so far
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// Launches that have failed in a row
    pub fn consecutive_failures(&self) -> u32 {
        self.failures
    }

    /// Start the player for `url`
    ///
    /// On failure no handle is held and the state falls back to Idle.
    pub fn launch(&mut self, url: &str) -> Result<(), PlayerError> {
        debug_assert!(self.handle.is_none(), "launch with a live handle");

        match self.command.spawn(url) {
            Ok(handle) => {
                info!(pid = ?handle.pid(), url, "player started");
                self.handle = Some(handle);
                self.state = SupervisorState::Running;
                self.failures = 0;
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, url, "error opening stream");
                self.state = SupervisorState::Idle;
                self.failures += 1;
                Err(e)
            }
        }
    }

    /// Non-blocking liveness poll
    ///
    /// Any exit, including a clean one, reports not-alive.
    pub fn is_alive(&mut self) -> bool {
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };

        match handle.try_status() {
            Ok(None) => true,
            Ok(Some(status)) => {
                debug!(pid = ?handle.pid(), code = ?status.code(), "player exited");
                false
            }
            Err(e) => {
                warn!(pid = ?handle.pid(), error = %e, "player status check failed");
                false
            }
        }
    }

    /// Stop the current player (if any) and start a fresh one for `url`
    pub async fn restart(&mut self, url: &str) -> Result<(), PlayerError> {
        self.state = SupervisorState::Restarting;
        self.restarts += 1;

        if let Some(old) = self.handle.take() {
            old.terminate(self.policy.termination_grace).await;
        }

        self.launch(url)
    }

    /// Terminate the player, if one is running
    pub async fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            info!(pid = ?handle.pid(), "stopping player");
            handle.terminate(self.policy.termination_grace).await;
        }
        if !self.state.is_terminal() {
            self.state = SupervisorState::Idle;
        }
    }

    /// One supervision step: poll, and restart if the player is gone
    pub async fn check(&mut self, url: &str) -> Check {
        if self.state.is_terminal() {
            return self.terminal_check();
        }

        let exit = match self.handle.as_mut() {
            Some(handle) => match handle.try_status() {
                Ok(None) => return Check::Alive,
                Ok(Some(status)) => Some((status, handle.uptime())),
                Err(e) => {
                    warn!(error = %e, "player status check failed");
                    None
                }
            },
            None => None,
        };

        if let Some((status, uptime)) = exit {
            if status.success() && !self.policy.restart_on_clean_exit {
                info!(uptime_secs = uptime.as_secs(), "player exited cleanly, not restarting");
                self.handle = None;
                self.state = SupervisorState::Finished;
                return Check::Finished;
            }
            info!(
                code = ?status.code(),
                uptime_secs = uptime.as_secs(),
                "stream has ended or failed, restarting"
            );
        }

        match self.restart(url).await {
            Ok(()) => Check::Restarted,
            Err(e) => {
                self.last_error = Some(e);
                if self.exhausted() {
                    self.state = SupervisorState::GaveUp;
                    Check::GaveUp
                } else {
                    Check::LaunchFailed
                }
            }
        }
    }

    fn terminal_check(&self) -> Check {
        match self.state {
            SupervisorState::GaveUp => Check::GaveUp,
            _ => Check::Finished,
        }
    }

    fn exhausted(&self) -> bool {
        self.policy
            .max_consecutive_failures
            .map(|max| self.failures >= max)
            .unwrap_or(false)
    }

    /// Launch and supervise `url` until a terminal outcome or `shutdown`
    ///
    /// The player is terminated when `shutdown` resolves.
    pub async fn run<F>(&mut self, url: &str, shutdown: F) -> Result<(), SupervisorError>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        if let Err(e) = self.launch(url) {
            self.last_error = Some(e);
            if self.exhausted() {
                self.state = SupervisorState::GaveUp;
            }
        }

        loop {
            if self.state.is_terminal() {
                break;
            }

            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    self.stop().await;
                    return Ok(());
                }
                _ = tokio::time::sleep(self.policy.poll_interval) => {}
            }

            match self.check(url).await {
                Check::Alive => debug!("player alive"),
                Check::Restarted => {}
                Check::LaunchFailed => {
                    debug!(failures = self.failures, "launch failed, retrying next cycle")
                }
                Check::Finished | Check::GaveUp => break,
            }
        }

        match self.state {
            SupervisorState::GaveUp => Err(SupervisorError::GaveUp {
                failures: self.failures,
                last: self
                    .last_error
                    .take()
                    .unwrap_or_else(|| PlayerError::NotFound(self.command.program.clone())),
            }),
            _ => Ok(()),
        }
    }
}
