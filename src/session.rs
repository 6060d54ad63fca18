//! Interactive viewing session
//!
//! Fetch the catalog, ask for a country, show the channel menu, validate
//! the choice and hand the stream URL to the [`Supervisor`]. Input and
//! output are injected so the whole flow runs against in-memory buffers.

use std::future::Future;
use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::info;

use crate::api::CatalogClient;
use crate::models::{ChannelStreamMapping, SelectionError};
use crate::resolver;
use crate::stream::{PlayerCommand, RestartPolicy, Supervisor, SupervisorError};

/// Session failures, each ending the session without playback
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Failed to load the channel catalog")]
    CatalogUnavailable,
    #[error("No channels found for this country ({0})")]
    NoChannels(String),
    #[error("Invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),
    #[error("Input closed before a choice was made")]
    InputClosed,
    #[error("Console I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Playback(#[from] SupervisorError),
}

/// The channel picked for playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub url: String,
}

/// Choices that can be made up front instead of prompted for
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Country code; prompted when absent
    pub country: Option<String>,
    /// 1-based menu choice; prompted when absent
    pub channel: Option<String>,
    /// Prompts allowed before an invalid choice ends the session
    pub selection_attempts: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            country: None,
            channel: None,
            selection_attempts: 3,
        }
    }
}

pub struct Session<R, W> {
    catalog: CatalogClient,
    player: PlayerCommand,
    policy: RestartPolicy,
    options: SessionOptions,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(
        catalog: CatalogClient,
        player: PlayerCommand,
        policy: RestartPolicy,
        options: SessionOptions,
        input: R,
        output: W,
    ) -> Self {
        Self {
            catalog,
            player,
            policy,
            options,
            input,
            output,
        }
    }

    /// Everything up to the chosen channel, without launching playback
    pub async fn prepare(&mut self) -> Result<Selection, SessionError> {
        let catalog = self.catalog.fetch_catalog().await;
        if catalog.is_unavailable() {
            return Err(SessionError::CatalogUnavailable);
        }
        info!(
            channels = catalog.channels.len(),
            streams = catalog.streams.len(),
            "catalog loaded"
        );

        let country = match self.options.country.clone() {
            Some(country) => country,
            None => {
                self.prompt("Enter the country code you are looking for (e.g., 'US', 'CN'): ")?
            }
        };
        let country = resolver::normalize_country(&country);

        let mapping = resolver::resolve(&catalog, &country);
        if mapping.is_empty() {
            return Err(SessionError::NoChannels(country));
        }

        self.print_menu(&mapping)?;
        self.choose(&mapping)
    }

    /// Prepare, then supervise playback until `shutdown` or a terminal outcome
    pub async fn run<F>(&mut self, shutdown: F) -> Result<Selection, SessionError>
    where
        F: Future<Output = ()>,
    {
        let selection = self.prepare().await?;

        writeln!(self.output, "Opening {}...", selection.name)?;
        self.output.flush()?;

        let mut supervisor = Supervisor::new(self.player.clone(), self.policy.clone());
        supervisor.run(&selection.url, shutdown).await?;

        Ok(selection)
    }

    fn print_menu(&mut self, mapping: &ChannelStreamMapping) -> io::Result<()> {
        for (idx, name) in mapping.names().enumerate() {
            writeln!(self.output, "{}. {}", idx + 1, name)?;
        }
        Ok(())
    }

    fn choose(&mut self, mapping: &ChannelStreamMapping) -> Result<Selection, SessionError> {
        if let Some(choice) = self.options.channel.clone() {
            let entry = mapping.select(&choice)?;
            return Ok(Selection {
                name: entry.name.clone(),
                url: entry.url.clone(),
            });
        }

        let attempts = self.options.selection_attempts.max(1);
        let mut last_error = SelectionError::Empty;

        for _ in 0..attempts {
            let answer = self.prompt("Select a channel to open (enter number): ")?;
            match mapping.select(&answer) {
                Ok(entry) => {
                    return Ok(Selection {
                        name: entry.name.clone(),
                        url: entry.url.clone(),
                    })
                }
                Err(e) => {
                    writeln!(self.output, "Invalid selection: {}", e)?;
                    last_error = e;
                }
            }
        }

        Err(SessionError::InvalidSelection(last_error))
    }

    /// Print `question` and read one line; EOF is an error
    fn prompt(&mut self, question: &str) -> Result<String, SessionError> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(SessionError::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    /// Consume the session, returning its output sink
    pub fn into_output(self) -> W {
        self.output
    }
}
