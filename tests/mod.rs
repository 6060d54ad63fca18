//! Integration tests for iptvwatch
//!
//! Tests are organized by component:
//! - catalog_test: iptv-org catalog client (mockito HTTP server)
//! - resolver_test: Country filter and channel to stream join
//! - supervisor_test: Player launch, liveness and restart policy (sh players)
//! - session_test: End-to-end flow (Catalog -> Country -> Menu -> Playback)
//! - commands_test: channels/watch handlers and exit code mapping

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
