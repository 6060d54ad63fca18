//! Playback infrastructure
//!
//! - Player: spawning the external player (streamlink by default)
//! - Supervisor: liveness polling and restart policy

pub mod player;
pub mod supervisor;

pub use player::{PlaybackHandle, PlayerCommand, PlayerError};
pub use supervisor::{Check, RestartPolicy, Supervisor, SupervisorError, SupervisorState};
