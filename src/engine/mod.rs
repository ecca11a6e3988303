//! Platform collaborator traits
//!
//! The controller never talks to a concrete playback backend. Everything
//! platform-specific — turning a track source into a buffering/decoding
//! pipeline, surfacing readiness, publishing lock-screen metadata — sits
//! behind the traits in this module. `crate::testing` provides in-memory
//! implementations for tests and examples.

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{NowPlayingInfo, TrackMetadata, TrackSource};

/// Callback registered on a playable handle
pub type HandleCallback = Box<dyn Fn() + Send>;

/// Callback for timed metadata extracted by the engine
pub type MetadataCallback = Box<dyn Fn(TrackMetadata) + Send>;

/// Resolves track sources into playable handles
///
/// `resolve` may be slow (network probing, library lookups) and is always
/// awaited off the controller's critical section.
#[async_trait]
pub trait PlaybackEngine: Send + Sync {
    /// Turn a track source into something playable
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be prepared for playback.
    async fn resolve(&self, source: &TrackSource) -> Result<Box<dyn PlayableHandle>>;
}

/// A track prepared for playback by the engine
///
/// The handle is exclusively owned by its track while that track is
/// current, and dropped when the track stops being current. Readiness,
/// end-of-track and timed metadata are reported through explicitly
/// registered callbacks; callbacks may fire from any thread and must hand
/// work back to the controller rather than blocking.
pub trait PlayableHandle: Send {
    /// Current playback position in seconds
    fn position_secs(&self) -> f64;

    /// Track duration in seconds, `None` while still unknown
    fn duration_secs(&self) -> Option<f64>;

    /// Seek to an absolute position in seconds
    fn seek(&mut self, seconds: f64);

    /// Start or resume playback
    fn start(&mut self);

    /// Pause playback
    fn pause(&mut self);

    /// Register the callback fired once the resource is ready to play
    fn set_ready_callback(&mut self, callback: HandleCallback);

    /// Register the callback fired when playback reaches the end
    fn set_ended_callback(&mut self, callback: HandleCallback);

    /// Register the callback fired when timed metadata becomes available
    fn set_metadata_callback(&mut self, callback: MetadataCallback);
}

/// External display surface for now-playing metadata
pub trait NowPlayingSink: Send + Sync {
    /// Publish the mapping for the current track, or `None` when nothing
    /// is playing
    fn publish(&self, info: Option<&NowPlayingInfo>);
}

/// Lookup of media-library items by persistent identifier
pub trait MediaLibrary: Send + Sync {
    /// Resolve a persistent identifier into a media item
    fn media_item(&self, persistent_id: u64) -> Option<MediaItem>;
}

/// A media-library entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Library-persistent identifier
    pub persistent_id: u64,

    /// URL of the playable asset, if the library exposes one
    pub asset_url: Option<String>,

    /// Track title
    pub title: Option<String>,

    /// Artist name
    pub artist: Option<String>,

    /// Album title
    pub album_title: Option<String>,

    /// Artwork image payload
    #[serde(skip)]
    pub artwork: Option<Bytes>,

    /// Whether the item can be played (DRM, cloud-only items may not be)
    pub playable: bool,
}

impl MediaItem {
    /// Create a playable item with the given persistent identifier
    #[must_use]
    pub fn new(persistent_id: u64) -> Self {
        Self {
            persistent_id,
            playable: true,
            ..Self::default()
        }
    }

    /// Builder method to set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set the artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Builder method to set the album title
    #[must_use]
    pub fn with_album_title(mut self, album_title: impl Into<String>) -> Self {
        self.album_title = Some(album_title.into());
        self
    }

    /// Builder method to set the asset URL
    #[must_use]
    pub fn with_asset_url(mut self, url: impl Into<String>) -> Self {
        self.asset_url = Some(url.into());
        self
    }

    /// Builder method to mark the item unplayable
    #[must_use]
    pub fn unplayable(mut self) -> Self {
        self.playable = false;
        self
    }
}

/// Transport commands arriving from the platform's remote-control surface
/// (lock screen, headset buttons, media keys)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    /// Start or resume playback
    Play,
    /// Pause playback
    Pause,
    /// Toggle between playing and paused
    TogglePlayPause,
    /// Skip to the next track
    NextTrack,
    /// Go back to the previous track
    PreviousTrack,
}
