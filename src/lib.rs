//! iptvwatch - watch live IPTV channels by country
//!
//! Fetches the iptv-org channel directory, lets the user pick a channel for
//! a country and keeps an external player (streamlink) running for it,
//! restarting the player whenever it exits.
//!
//! # Modules
//!
//! - `models` - Channels, streams and the channel menu mapping
//! - `api` - iptv-org catalog client
//! - `resolver` - Country filter and channel to stream join
//! - `stream` - Player spawning and playback supervision
//! - `session` - Interactive selection flow
//! - `cli`, `commands`, `config` - Command line surface

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod resolver;
pub mod session;
pub mod stream;

// Re-export commonly used types
pub use models::{
    Catalog, Channel, ChannelStreamMapping, MappingEntry, SelectionError, Stream,
};

pub use api::{CatalogClient, CatalogError};
pub use session::{Selection, Session, SessionError, SessionOptions};
pub use stream::{PlayerCommand, RestartPolicy, Supervisor, SupervisorState};
