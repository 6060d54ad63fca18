//! CLI - Command Line Interface for iptvwatch
//!
//! Run without arguments for the interactive picker. Flags pre-answer the
//! prompts and override the config file; `channels` lists a country's
//! channels without playing anything.
//!
//! # Examples
//!
//! ```bash
//! # Interactive: prompts for country and channel
//! iptvwatch
//!
//! # Pre-answered, check every 30 seconds
//! iptvwatch watch --country gb --channel 1 --interval 30
//!
//! # List channels as JSON
//! iptvwatch channels us --json
//! ```

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use crate::config::Config;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments or menu selection
    InvalidArgs = 2,
    /// Catalog could not be fetched
    NetworkError = 3,
    /// No channels for the country
    NoChannels = 4,
    /// Player could not be started (restart limit reached)
    PlayerFailed = 5,
    /// Stopped by Ctrl-C
    Interrupted = 130,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// iptvwatch - watch live IPTV channels from the iptv-org directory
///
/// Run without arguments to pick a channel interactively.
#[derive(Parser, Debug)]
#[command(
    name = "iptvwatch",
    version,
    about = "Watch live IPTV channels by country with automatic restarts",
    long_about = "Pick a live TV channel by country code from the iptv-org \
                  directory and watch it with streamlink. The player is \
                  checked periodically and restarted if it dies.",
    after_help = "EXAMPLES:\n\
                  iptvwatch                                Interactive picker\n\
                  iptvwatch watch -C gb -n 1               Watch the first GB channel\n\
                  iptvwatch channels us --json             List US channels"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY, listing only)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run (omit for interactive watch)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if JSON output should be used
    ///
    /// Only the channel listing has a JSON form; watch is always text.
    pub fn should_json(&self) -> bool {
        matches!(self.command, Some(Command::Channels(_)))
            && (self.json || !std::io::stdout().is_terminal())
    }

    /// Config from `--config`, or the default location
    pub fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => Config::load_from(path),
            None => Ok(Config::load()),
        }
    }

    /// Default log filter for the verbosity flags
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pick a channel and watch it (default)
    #[command(visible_alias = "w")]
    Watch(WatchCmd),

    /// List channels with streams for a country
    #[command(visible_alias = "ls")]
    Channels(ChannelsCmd),
}

// =============================================================================
// Watch Command
// =============================================================================

/// Pick a channel and supervise playback
#[derive(Args, Debug, Default, Clone)]
pub struct WatchCmd {
    /// Country code (e.g. US, GB); prompted when omitted
    #[arg(long, short = 'C')]
    pub country: Option<String>,

    /// Channel number from the menu; prompted when omitted
    #[arg(long, short = 'n')]
    pub channel: Option<String>,

    /// Player program (default: streamlink)
    #[arg(long, short = 'p')]
    pub player: Option<String>,

    /// Stream quality passed to the player (default: best)
    #[arg(long, short = 'Q')]
    pub quality: Option<String>,

    /// Seconds between liveness checks (default: 60)
    #[arg(long, short = 'i', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Give up after this many failed player launches in a row
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_failures: Option<u32>,

    /// Stop watching when the player exits cleanly instead of restarting
    #[arg(long)]
    pub stop_on_exit: bool,
}

impl WatchCmd {
    /// Layer these flags over `config`
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(player) = &self.player {
            config.player = Some(player.clone());
        }
        if let Some(quality) = &self.quality {
            config.quality = Some(quality.clone());
        }
        if let Some(interval) = self.interval {
            config.poll_interval_secs = Some(interval);
        }
        if let Some(max) = self.max_failures {
            config.max_consecutive_failures = Some(max);
        }
        if self.stop_on_exit {
            config.restart_on_clean_exit = Some(false);
        }
        config
    }
}

// =============================================================================
// Channels Command
// =============================================================================

/// List the channels that have a stream for a country
#[derive(Args, Debug)]
pub struct ChannelsCmd {
    /// Country code (e.g. US, GB)
    #[arg(required = true)]
    pub country: String,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// One row of the `channels` listing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelListing {
    pub index: usize,
    pub name: String,
    pub url: String,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Same verbosity, plain text only
    pub fn interactive(&self) -> Self {
        Self {
            json: false,
            quiet: self.quiet,
        }
    }

    /// Write success data as a JSON envelope
    pub fn print<T: Serialize, W: Write>(&self, out: &mut W, data: T) -> anyhow::Result<()> {
        let output = JsonOutput::success(data);
        writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        Ok(())
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Country Code Validation
// =============================================================================

/// Validate a country code argument (2-3 ASCII letters)
pub fn validate_country(code: &str) -> Result<&str, &'static str> {
    let code = code.trim();
    if (2..=3).contains(&code.len()) && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err("Invalid country code (expected 2-3 letters, e.g. US)")
    }
}

// =============================================================================
// Tests
// =============================================================================
