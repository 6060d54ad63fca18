//! Command Handler Tests
//!
//! Drives the `channels` and `watch` handlers against a mocked catalog and
//! checks listings, exit codes and the session error mapping.

use iptvwatch::cli::{ChannelsCmd, ExitCode, Output, WatchCmd};
use iptvwatch::commands::{channels_cmd, session_exit_code, watch_cmd};
use iptvwatch::config::Config;
use iptvwatch::models::SelectionError;
use iptvwatch::session::SessionError;
use iptvwatch::stream::{PlayerError, SupervisorError};
use mockito::{Mock, Server, ServerGuard};

const CHANNELS: &str = r#"[
    {"id": "bbc1", "name": "BBC One", "country": "GB"},
    {"id": "bbc2", "name": "BBC Two", "country": "GB"},
    {"id": "cnn", "name": "CNN", "country": "US"}
]"#;

const STREAMS: &str = r#"[
    {"channel": "bbc1", "url": "http://x/stream.m3u8"},
    {"channel": "bbc2", "url": "http://y/two.m3u8"},
    {"channel": "cnn", "url": "http://cnn/live.m3u8"}
]"#;

async fn catalog_server(streams_status: usize) -> (ServerGuard, Vec<Mock>) {
    let mut server = Server::new_async().await;
    let channels = server
        .mock("GET", "/channels.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CHANNELS)
        .create_async()
        .await;
    let streams = server
        .mock("GET", "/streams.json")
        .with_status(streams_status)
        .with_header("content-type", "application/json")
        .with_body(STREAMS)
        .create_async()
        .await;
    (server, vec![channels, streams])
}

fn config_for(server: &ServerGuard) -> Config {
    Config {
        channels_url: Some(format!("{}/channels.json", server.url())),
        streams_url: Some(format!("{}/streams.json", server.url())),
        ..Default::default()
    }
}

fn output(json: bool) -> Output {
    Output { json, quiet: true }
}

fn channels(country: &str) -> ChannelsCmd {
    ChannelsCmd {
        country: country.to_string(),
    }
}

// =============================================================================
// Channels Listing
// =============================================================================

/// Test: Text listing is numbered in catalog order with name and URL
#[tokio::test]
async fn test_channels_text_listing() {
    let (server, _mocks) = catalog_server(200).await;
    let mut out = Vec::new();

    let code = channels_cmd(channels("gb"), config_for(&server), &output(false), &mut out).await;

    assert_eq!(code, ExitCode::Success);
    let text = String::from_utf8(out).unwrap();
    assert_eq!(
        text,
        "1. BBC One  http://x/stream.m3u8\n2. BBC Two  http://y/two.m3u8\n"
    );
}

/// Test: JSON listing is a success envelope with 1-based indexes
#[tokio::test]
async fn test_channels_json_listing() {
    let (server, _mocks) = catalog_server(200).await;
    let mut out = Vec::new();

    let code = channels_cmd(channels("GB"), config_for(&server), &output(true), &mut out).await;

    assert_eq!(code, ExitCode::Success);
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert!(value.get("error").is_none());
    let data = value["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["index"], 1);
    assert_eq!(data[0]["name"], "BBC One");
    assert_eq!(data[0]["url"], "http://x/stream.m3u8");
    assert_eq!(data[1]["index"], 2);
    assert_eq!(data[1]["name"], "BBC Two");
}

/// Test: A failed catalog fetch is a network error and prints nothing
#[tokio::test]
async fn test_channels_catalog_unavailable() {
    let (server, _mocks) = catalog_server(500).await;
    let mut out = Vec::new();

    let code = channels_cmd(channels("gb"), config_for(&server), &output(false), &mut out).await;

    assert_eq!(code, ExitCode::NetworkError);
    assert!(out.is_empty());
}

/// Test: A country without streams exits with the no-channels code
#[tokio::test]
async fn test_channels_unknown_country() {
    let (server, _mocks) = catalog_server(200).await;
    let mut out = Vec::new();

    let code = channels_cmd(channels("zz"), config_for(&server), &output(true), &mut out).await;

    assert_eq!(code, ExitCode::NoChannels);
    assert!(out.is_empty());
}

/// Test: A malformed country code is rejected before any request
#[tokio::test]
async fn test_channels_bad_country_code() {
    let mut out = Vec::new();
    let config = Config {
        channels_url: Some("http://127.0.0.1:1/channels.json".into()),
        streams_url: Some("http://127.0.0.1:1/streams.json".into()),
        ..Default::default()
    };

    let code = channels_cmd(channels("g1"), config, &output(false), &mut out).await;

    assert_eq!(code, ExitCode::InvalidArgs);
    assert!(out.is_empty());
}

// =============================================================================
// Watch
// =============================================================================

/// Test: A malformed --country fails before the banner or any prompt
#[tokio::test]
async fn test_watch_bad_country_code() {
    let cmd = WatchCmd {
        country: Some("United Kingdom".into()),
        ..Default::default()
    };

    let code = watch_cmd(cmd, Config::default(), &output(true)).await;

    assert_eq!(code, ExitCode::InvalidArgs);
}

// =============================================================================
// Session Error Mapping
// =============================================================================

/// Test: Every session failure maps to its documented exit code
#[test]
fn test_session_exit_codes() {
    let cases = vec![
        (SessionError::CatalogUnavailable, ExitCode::NetworkError),
        (SessionError::NoChannels("ZZ".into()), ExitCode::NoChannels),
        (
            SessionError::InvalidSelection(SelectionError::OutOfRange { choice: 99, max: 3 }),
            ExitCode::InvalidArgs,
        ),
        (
            SessionError::InvalidSelection(SelectionError::NotANumber("abc".into())),
            ExitCode::InvalidArgs,
        ),
        (SessionError::InputClosed, ExitCode::Error),
        (
            SessionError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed")),
            ExitCode::Error,
        ),
        (
            SessionError::Playback(SupervisorError::GaveUp {
                failures: 3,
                last: PlayerError::NotFound("streamlink".into()),
            }),
            ExitCode::PlayerFailed,
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(session_exit_code(&error), expected, "{}", error);
    }
}
