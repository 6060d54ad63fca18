//! Data structures and types for iptvwatch
//!
//! Contains the shared models used across the application:
//! - **Catalog**: channels and streams as published by iptv-org
//! - **Mapping**: the ordered channel name to stream URL menu
//! - **Selection**: validation of the user's menu choice

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Catalog Models (iptv-org)
// =============================================================================

/// A broadcast channel from the channels catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
}

impl Channel {
    /// Create a channel (mostly useful for tests and fixtures)
    pub fn new(id: impl Into<String>, name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            country: Some(country.into()),
        }
    }
}

/// A playable stream from the streams catalog
///
/// iptv-org publishes some streams with a `null` channel; those never
/// match any channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    #[serde(default)]
    pub channel: Option<String>,
    pub url: String,
}

impl Stream {
    pub fn new(channel: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            channel: Some(channel.into()),
            url: url.into(),
        }
    }
}

/// Both catalog collections, fetched once per session
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub channels: Vec<Channel>,
    pub streams: Vec<Stream>,
}

impl Catalog {
    /// Either collection being empty means the catalog is unusable
    pub fn is_unavailable(&self) -> bool {
        self.channels.is_empty() || self.streams.is_empty()
    }
}

// =============================================================================
// Channel -> Stream Mapping
// =============================================================================

/// One menu entry: channel display name and its chosen stream URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub name: String,
    pub url: String,
}

/// Ordered mapping from channel display name to stream URL
///
/// Keys are display names, not channel ids. Inserting a name that is
/// already present replaces its URL and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelStreamMapping {
    entries: Vec<MappingEntry>,
}

impl ChannelStreamMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the URL for `name`
    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
        let name = name.into();
        let url = url.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.url = url,
            None => self.entries.push(MappingEntry { name, url }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.url.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by 0-based position
    pub fn entry(&self, index: usize) -> Option<&MappingEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MappingEntry> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Validate a raw 1-based menu choice and return the matching entry
    pub fn select(&self, input: &str) -> Result<&MappingEntry, SelectionError> {
        let index = parse_selection(input, self.len())?;
        // parse_selection guarantees the range
        self.entries
            .get(index)
            .ok_or(SelectionError::OutOfRange {
                choice: index + 1,
                max: self.len(),
            })
    }
}

// =============================================================================
// Menu Selection
// =============================================================================

/// Reasons a menu choice is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("No selection entered")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("{choice} is out of range (choose 1-{max})")]
    OutOfRange { choice: usize, max: usize },
}

/// Parse a 1-based menu choice into a 0-based index below `len`
pub fn parse_selection(input: &str, len: usize) -> Result<usize, SelectionError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SelectionError::Empty);
    }

    let choice: usize = trimmed
        .parse()
        .map_err(|_| SelectionError::NotANumber(trimmed.to_string()))?;

    if choice == 0 || choice > len {
        return Err(SelectionError::OutOfRange { choice, max: len });
    }

    Ok(choice - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_deserialize_ignores_extra_fields() {
        let json = r#"{"id":"bbc1","name":"BBC One","country":"GB","languages":["eng"],"is_nsfw":false}"#;
        let channel: Channel = serde_json::from_str(json).unwrap();
        assert_eq!(channel, Channel::new("bbc1", "BBC One", "GB"));
    }

    #[test]
    fn test_stream_null_channel() {
        let json = r#"{"channel":null,"url":"http://x/a.m3u8"}"#;
        let stream: Stream = serde_json::from_str(json).unwrap();
        assert!(stream.channel.is_none());
    }

    #[test]
    fn test_mapping_insert_keeps_position_on_overwrite() {
        let mut mapping = ChannelStreamMapping::new();
        mapping.insert("News", "http://a");
        mapping.insert("Sports", "http://b");
        mapping.insert("News", "http://c");

        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.entry(0).unwrap().name, "News");
        assert_eq!(mapping.get("News"), Some("http://c"));
        assert_eq!(mapping.names().collect::<Vec<_>>(), vec!["News", "Sports"]);
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("1", 3), Ok(0));
        assert_eq!(parse_selection(" 3\n", 3), Ok(2));
        assert_eq!(parse_selection("", 3), Err(SelectionError::Empty));
        assert_eq!(
            parse_selection("abc", 3),
            Err(SelectionError::NotANumber("abc".to_string()))
        );
        assert_eq!(
            parse_selection("99", 3),
            Err(SelectionError::OutOfRange { choice: 99, max: 3 })
        );
        assert_eq!(
            parse_selection("0", 3),
            Err(SelectionError::OutOfRange { choice: 0, max: 3 })
        );
        // Negative numbers never parse as usize
        assert!(matches!(
            parse_selection("-1", 3),
            Err(SelectionError::NotANumber(_))
        ));
    }

    #[test]
    fn test_select_returns_entry() {
        let mut mapping = ChannelStreamMapping::new();
        mapping.insert("BBC One", "http://x/stream.m3u8");
        let entry = mapping.select("1").unwrap();
        assert_eq!(entry.url, "http://x/stream.m3u8");
        assert!(mapping.select("2").is_err());
    }

    #[test]
    fn test_catalog_unavailable() {
        let mut catalog = Catalog::default();
        assert!(catalog.is_unavailable());
        catalog.channels.push(Channel::new("a", "A", "US"));
        assert!(catalog.is_unavailable());
        catalog.streams.push(Stream::new("a", "http://a"));
        assert!(!catalog.is_unavailable());
    }
}
