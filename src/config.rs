//! Configuration management for iptvwatch
//!
//! Handles config file loading and turns it into runtime settings.
//! Config is stored at ~/.config/iptvwatch/config.toml unless `--config`
//! points somewhere else.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::catalog::{CatalogClient, CHANNELS_URL, STREAMS_URL};
use crate::stream::{PlayerCommand, RestartPolicy};

/// Application configuration
///
/// Every key is optional; missing keys fall back to built-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Channels catalog URL
    pub channels_url: Option<String>,
    /// Streams catalog URL
    pub streams_url: Option<String>,
    /// Player program (default: streamlink)
    pub player: Option<String>,
    /// Extra player arguments placed before the stream URL
    pub player_args: Option<Vec<String>>,
    /// Quality selector passed to the player (default: best)
    pub quality: Option<String>,
    /// Seconds between liveness checks (default: 60)
    pub poll_interval_secs: Option<u64>,
    /// Give up after this many failed launches in a row (default: never)
    pub max_consecutive_failures: Option<u32>,
    /// Restart when the player exits with status 0 (default: true)
    pub restart_on_clean_exit: Option<bool>,
    /// Catalog request timeout in seconds (default: none)
    pub fetch_timeout_secs: Option<u64>,
    /// Seconds a stopped player gets before it is killed (default: 5)
    pub termination_grace_secs: Option<u64>,
}

impl Config {
    /// Get config file path (~/.config/iptvwatch/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("iptvwatch").join("config.toml"))
    }

    /// Load config from the default path, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| Self::parse(&s).ok())
            .unwrap_or_default()
    }

    /// Load an explicitly requested config file; errors are reported
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse TOML and check the value ranges
    pub fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Zero would busy-poll the player or give up before the first launch
    fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == Some(0) {
            bail!("poll_interval_secs must be at least 1");
        }
        if self.max_consecutive_failures == Some(0) {
            bail!("max_consecutive_failures must be at least 1");
        }
        Ok(())
    }

    /// Catalog client for the configured URLs
    pub fn catalog_client(&self) -> CatalogClient {
        let client = CatalogClient::with_urls(
            self.channels_url.as_deref().unwrap_or(CHANNELS_URL),
            self.streams_url.as_deref().unwrap_or(STREAMS_URL),
        );
        match self.fetch_timeout_secs {
            Some(secs) => client.with_timeout(Duration::from_secs(secs)),
            None => client,
        }
    }

    /// Player invocation from the configured program, args and quality
    pub fn player_command(&self) -> PlayerCommand {
        let mut cmd = match &self.player {
            Some(program) => PlayerCommand::new(program.clone()),
            None => PlayerCommand::default(),
        };
        if let Some(args) = &self.player_args {
            cmd = cmd.with_args(args.iter().cloned());
        }
        if let Some(quality) = &self.quality {
            cmd = cmd.with_quality(quality.clone());
        }
        cmd
    }

    /// Restart policy with defaults filled in
    pub fn restart_policy(&self) -> RestartPolicy {
        let defaults = RestartPolicy::default();
        RestartPolicy {
            poll_interval: self
                .poll_interval_secs
                .map(|secs| Duration::from_secs(secs.max(1)))
                .unwrap_or(defaults.poll_interval),
            restart_on_clean_exit: self
                .restart_on_clean_exit
                .unwrap_or(defaults.restart_on_clean_exit),
            max_consecutive_failures: self
                .max_consecutive_failures
                .map(|max| max.max(1))
                .or(defaults.max_consecutive_failures),
            termination_grace: self
                .termination_grace_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.termination_grace),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.player.is_none());
        assert_eq!(config.player_command(), PlayerCommand::default());
        assert_eq!(config.restart_policy(), RestartPolicy::default());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = Config::parse(
            r#"
            player = "streamlink"
            player_args = ["--player", "mpv"]
            quality = "720p"
            poll_interval_secs = 15
            max_consecutive_failures = 4
            restart_on_clean_exit = false
            "#,
        )
        .unwrap();

        let cmd = config.player_command();
        assert_eq!(cmd.args_for("http://a"), vec!["--player", "mpv", "http://a", "720p"]);

        let policy = config.restart_policy();
        assert_eq!(policy.poll_interval, Duration::from_secs(15));
        assert_eq!(policy.max_consecutive_failures, Some(4));
        assert!(!policy.restart_on_clean_exit);
        assert_eq!(policy.termination_grace, Duration::from_secs(5));
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(Config::parse("poll_interval_secs = \"soon\"").is_err());
    }

    #[test]
    fn test_catalog_urls_override() {
        let config = Config {
            channels_url: Some("http://localhost/c.json".into()),
            ..Default::default()
        };
        let client = config.catalog_client();
        assert_eq!(client.channels_url(), "http://localhost/c.json");
        assert_eq!(client.streams_url(), STREAMS_URL);
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let err = Config::parse("poll_interval_secs = 0").unwrap_err();
        assert!(err.to_string().contains("poll_interval_secs"));
        assert!(Config::parse("poll_interval_secs = 1").is_ok());
    }

    #[test]
    fn test_zero_max_failures_rejected() {
        let err = Config::parse("max_consecutive_failures = 0").unwrap_err();
        assert!(err.to_string().contains("max_consecutive_failures"));
        assert!(Config::parse("max_consecutive_failures = 1").is_ok());
    }

    #[test]
    fn test_zero_values_clamped_in_policy() {
        let config = Config {
            poll_interval_secs: Some(0),
            max_consecutive_failures: Some(0),
            ..Default::default()
        };
        let policy = config.restart_policy();
        assert_eq!(policy.poll_interval, Duration::from_secs(1));
        assert_eq!(policy.max_consecutive_failures, Some(1));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir()
            .join(format!("iptvwatch-config-{}.toml", std::process::id()));
        std::fs::write(&path, "quality = \"480p\"\npoll_interval_secs = 30\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(
            loaded,
            Config {
                quality: Some("480p".into()),
                poll_interval_secs: Some(30),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_load_from_rejects_zero_interval() {
        let path = std::env::temp_dir()
            .join(format!("iptvwatch-zero-{}.toml", std::process::id()));
        std::fs::write(&path, "poll_interval_secs = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);

        assert!(format!("{:#}", err).contains("poll_interval_secs must be at least 1"));
    }

    #[test]
    fn test_load_from_missing_file_errors() {
        assert!(Config::load_from(Path::new("/nonexistent/iptvwatch.toml")).is_err());
    }
}
