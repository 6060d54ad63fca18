//! CLI Command Handlers
//!
//! Implements the CLI commands on top of the session and catalog layers.
//! Each handler takes its args, the loaded config and Output, returns ExitCode.

use std::future::Future;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::cli::{validate_country, ChannelListing, ChannelsCmd, ExitCode, Output, WatchCmd};
use crate::config::Config;
use crate::resolver;
use crate::session::{Session, SessionError, SessionOptions};
use crate::stream::SupervisorError;

const BANNER: &str = r#"
      \     /
       \   /
        \ /
       /~~~~~\
,-------------------,
| ,---------------, |
| |               | |
| |               | |
| |               | |
| |               | |
| |_______________| |
|___________________|
|___________________|

_________ _______ _________            _______ _________ _        ______   _______  _______
\__   __/(  ____ )\__   __/|\     /|  (  ____ \__   __/( (    /|(  __  \ (  ____ \(  ____ )
   ) (   | (    )|   ) (   | )   ( |  | (    \/   ) (   |  \  ( || (  \  )| (    \/| (    )|
   | |   | (____)|   | |   | |   | |  | (__       | |   |   \ | || |   ) || (__    | (____)|
   | |   |  _____)   | |   ( (   ) )  |  __)      | |   | (\ \) || |   | ||  __)   |     __)
   | |   | (         | |    \ \_/ /   | (         | |   | | \   || |   ) || (      | (\ (
___) (___| )         | |     \   /    | )      ___) (___| )  \  || (__/  )| (____/\| ) \ \__
\_______/|/          )_(      \_/     |/       \_______/|/    )_)(______/ (_______/|/   \__/
"#;

// =============================================================================
// Watch Command
// =============================================================================

pub async fn watch_cmd(cmd: WatchCmd, config: Config, output: &Output) -> ExitCode {
    // The interactive flow never speaks JSON
    let output = &output.interactive();

    if let Some(country) = cmd.country.as_deref() {
        if let Err(e) = validate_country(country) {
            return output.error(e, ExitCode::InvalidArgs);
        }
    }

    let config = cmd.apply(config);
    let player = config.player_command();
    let policy = config.restart_policy();

    if !output.quiet {
        println!("{}", BANNER);
    }

    if !player.is_available().await {
        // Not fatal: the supervisor keeps retrying the launch
        output.info(format!(
            "Warning: '{}' not found on PATH, playback will fail until it is installed",
            player.program
        ));
    }

    let options = SessionOptions {
        country: cmd.country.clone(),
        channel: cmd.channel.clone(),
        ..Default::default()
    };

    let stdin = io::stdin();
    let mut session = Session::new(
        config.catalog_client(),
        player,
        policy,
        options,
        stdin.lock(),
        io::stdout(),
    );

    let interrupted = Arc::new(AtomicBool::new(false));

    match session.run(ctrl_c(interrupted.clone())).await {
        Ok(selection) => {
            if interrupted.load(Ordering::SeqCst) {
                output.info(format!("Stopped watching {}", selection.name));
                ExitCode::Interrupted
            } else {
                output.info(format!("{} finished", selection.name));
                ExitCode::Success
            }
        }
        Err(e) => output.error(e.to_string(), session_exit_code(&e)),
    }
}

/// Resolves on Ctrl-C, recording that it happened
fn ctrl_c(flag: Arc<AtomicBool>) -> impl Future<Output = ()> {
    async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => flag.store(true, Ordering::SeqCst),
            Err(e) => {
                warn!(error = %e, "cannot listen for Ctrl-C");
                std::future::pending::<()>().await
            }
        }
    }
}

/// Exit code for a session that ended without playback
pub fn session_exit_code(e: &SessionError) -> ExitCode {
    match e {
        SessionError::CatalogUnavailable => ExitCode::NetworkError,
        SessionError::NoChannels(_) => ExitCode::NoChannels,
        SessionError::InvalidSelection(_) => ExitCode::InvalidArgs,
        SessionError::InputClosed | SessionError::Io(_) => ExitCode::Error,
        SessionError::Playback(SupervisorError::GaveUp { .. }) => ExitCode::PlayerFailed,
    }
}

// =============================================================================
// Channels Command
// =============================================================================

/// List a country's channels to `out`, as text or a JSON envelope
pub async fn channels_cmd<W: Write>(
    cmd: ChannelsCmd,
    config: Config,
    output: &Output,
    out: &mut W,
) -> ExitCode {
    let country = match validate_country(&cmd.country) {
        Ok(c) => c,
        Err(e) => return output.error(e, ExitCode::InvalidArgs),
    };

    output.info(format!("Fetching channels for {}...", country.to_uppercase()));

    let catalog = config.catalog_client().fetch_catalog().await;
    if catalog.is_unavailable() {
        return output.error("Failed to load the channel catalog", ExitCode::NetworkError);
    }

    let mapping = resolver::resolve(&catalog, country);
    if mapping.is_empty() {
        return output.error("No channels found for this country.", ExitCode::NoChannels);
    }

    let written = if output.json {
        let listing: Vec<ChannelListing> = mapping
            .iter()
            .enumerate()
            .map(|(idx, entry)| ChannelListing {
                index: idx + 1,
                name: entry.name.clone(),
                url: entry.url.clone(),
            })
            .collect();

        output.print(out, &listing)
    } else {
        mapping
            .iter()
            .enumerate()
            .try_for_each(|(idx, entry)| {
                writeln!(out, "{}. {}  {}", idx + 1, entry.name, entry.url)
            })
            .map_err(anyhow::Error::from)
    };

    match written {
        Ok(()) => ExitCode::Success,
        Err(e) => output.error(format!("Failed to write listing: {}", e), ExitCode::Error),
    }
}
