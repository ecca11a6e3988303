//! Now-playing metadata mapping

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Well-known now-playing keys
///
/// These stand in for the platform's media-item property keys; hosts map
/// them onto whatever their display surface expects.
pub mod keys {
    /// Track title
    pub const TITLE: &str = "title";
    /// Artist name
    pub const ARTIST: &str = "artist";
    /// Album title
    pub const ALBUM_TITLE: &str = "album-title";
    /// Artwork image payload
    pub const ARTWORK: &str = "artwork";
    /// Track duration in seconds
    pub const PLAYBACK_DURATION: &str = "playback-duration";
    /// Elapsed playback time in seconds
    pub const ELAPSED_PLAYBACK_TIME: &str = "elapsed-playback-time";
}

/// A value in the now-playing mapping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Text value (title, artist, ...)
    Text(String),
    /// Numeric value (durations, times)
    Number(f64),
    /// Binary payload (artwork)
    Bytes(Bytes),
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for MetadataValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Bytes> for MetadataValue {
    fn from(value: Bytes) -> Self {
        Self::Bytes(value)
    }
}

/// Key-value description of the current track for external display
///
/// The controller maintains this mapping; the platform owns the display
/// (lock screen, media controls overlay, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingInfo {
    entries: BTreeMap<String, MetadataValue>,
}

impl NowPlayingInfo {
    /// Create an empty mapping
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value for a key
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Get the value for a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    /// Get the text value for a key, if it is text
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(MetadataValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric value for a key, if it is numeric
    #[must_use]
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.entries.get(key) {
            Some(MetadataValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the mapping is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Timed metadata delivered by the playback engine mid-stream
///
/// Engines that extract embedded metadata (ICY tags, chapter marks, ...)
/// hand it over through the handle's metadata callback; the controller
/// merges it into the current track's now-playing mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    /// Track title
    pub title: Option<String>,
    /// Artist name
    pub artist: Option<String>,
    /// Album title
    pub album: Option<String>,
    /// Artwork image payload
    pub artwork: Option<Bytes>,
}
