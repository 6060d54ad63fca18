//! iptvwatch - watch live IPTV channels by country
//!
//! Picks a channel from the iptv-org directory, opens it with streamlink and
//! keeps the player running, restarting it whenever it exits.
//!
//! # Usage
//!
//! ```bash
//! # Interactive picker
//! iptvwatch
//!
//! # Pre-answered prompts
//! iptvwatch watch --country gb --channel 1
//!
//! # Listing only
//! iptvwatch channels us --json
//! ```

use clap::Parser;
use tracing_subscriber::EnvFilter;

use iptvwatch::cli::{Cli, Command, ExitCode, Output, WatchCmd};
use iptvwatch::commands;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    run_cli(cli).await.into()
}

/// Run the selected command and return its exit code
async fn run_cli(cli: Cli) -> ExitCode {
    let output = Output::new(&cli);

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => return output.error(format!("{:#}", e), ExitCode::InvalidArgs),
    };

    match cli.command {
        Some(Command::Watch(cmd)) => commands::watch_cmd(cmd, config, &output).await,

        Some(Command::Channels(cmd)) => {
            commands::channels_cmd(cmd, config, &output, &mut std::io::stdout()).await
        }

        None => commands::watch_cmd(WatchCmd::default(), config, &output).await,
    }
}
