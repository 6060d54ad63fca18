//! Channel resolution
//!
//! Filters the channel catalog by country and joins each channel to its
//! first stream. Pure functions over in-memory collections.

use crate::models::{Catalog, Channel, ChannelStreamMapping, Stream};

/// Uppercase and trim a country code for comparison
pub fn normalize_country(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Channels whose country matches `code`, in catalog order
///
/// Both sides are normalized, so "gb" matches "GB". An empty code
/// matches nothing.
pub fn filter_by_country<'a>(channels: &'a [Channel], code: &str) -> Vec<&'a Channel> {
    let code = normalize_country(code);
    if code.is_empty() {
        return Vec::new();
    }

    channels
        .iter()
        .filter(|c| {
            c.country
                .as_deref()
                .map(|country| normalize_country(country) == code)
                .unwrap_or(false)
        })
        .collect()
}

/// Map each channel's display name to its first matching stream URL
///
/// Channels with no stream are left out. Two channels with the same name
/// collapse into one entry holding the later channel's URL.
pub fn match_streams<'a, I>(channels: I, streams: &[Stream]) -> ChannelStreamMapping
where
    I: IntoIterator<Item = &'a Channel>,
{
    let mut mapping = ChannelStreamMapping::new();

    for channel in channels {
        let first = streams
            .iter()
            .find(|s| s.channel.as_deref() == Some(channel.id.as_str()));

        if let Some(stream) = first {
            mapping.insert(channel.name.clone(), stream.url.clone());
        }
    }

    mapping
}

/// Filter the catalog by country and join to streams
pub fn resolve(catalog: &Catalog, code: &str) -> ChannelStreamMapping {
    let filtered = filter_by_country(&catalog.channels, code);
    match_streams(filtered, &catalog.streams)
}
