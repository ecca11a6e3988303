//! Track descriptors and batch factories

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::engine::{MediaItem, MediaLibrary, PlayableHandle};
use super::now_playing::{NowPlayingInfo, TrackMetadata, keys};

/// Unique identifier for a track instance
///
/// Queue history refers to tracks by id so the entries stay meaningful
/// after the owning queue slot has been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub u64);

impl TrackId {
    /// Generate a new process-unique id
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a track's audio comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackSource {
    /// Remote or local URL
    Url(String),
    /// Media-library item, resolved by persistent identifier at play time
    Library {
        /// Library-persistent identifier
        persistent_id: u64,
    },
}

impl fmt::Display for TrackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "url:{url}"),
            Self::Library { persistent_id } => write!(f, "library:{persistent_id}"),
        }
    }
}

/// Minimal URL sanity check standing in for a platform URL parser
fn is_valid_url(candidate: &str) -> bool {
    !candidate.is_empty()
        && !candidate.contains(char::is_whitespace)
        && candidate.contains("://")
}

/// A playable item in the queue
///
/// Owns the resolved playable handle while (and only while) it is the
/// queue's current track, and maintains the now-playing mapping derived
/// from its source and any timed metadata the engine reports.
pub struct AudioTrack {
    id: TrackId,
    source: TrackSource,
    media_item: Option<MediaItem>,
    handle: Option<Box<dyn PlayableHandle>>,
    now_playing: Option<NowPlayingInfo>,
}

impl fmt::Debug for AudioTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioTrack")
            .field("id", &self.id)
            .field("source", &self.source)
            .field("has_handle", &self.handle.is_some())
            .finish_non_exhaustive()
    }
}

impl AudioTrack {
    fn new(source: TrackSource) -> Self {
        Self {
            id: TrackId::new(),
            source,
            media_item: None,
            handle: None,
            now_playing: None,
        }
    }

    /// Create a track from a URL string
    ///
    /// Returns `None` for strings that cannot be a URL; batch factories
    /// rely on this to skip bad entries instead of failing the batch.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        if is_valid_url(url) {
            Some(Self::new(TrackSource::Url(url.to_string())))
        } else {
            None
        }
    }

    /// Create a track from an already-resolved media item
    ///
    /// Returns `None` for items that report themselves unplayable.
    #[must_use]
    pub fn from_media_item(item: MediaItem) -> Option<Self> {
        if !item.playable {
            return None;
        }
        let mut track = Self::new(TrackSource::Library {
            persistent_id: item.persistent_id,
        });
        track.media_item = Some(item);
        Some(track)
    }

    /// Create a track that resolves its media item lazily at play time
    #[must_use]
    pub fn from_persistent_id(persistent_id: u64) -> Self {
        Self::new(TrackSource::Library { persistent_id })
    }

    /// The track's unique id
    #[must_use]
    pub fn id(&self) -> TrackId {
        self.id
    }

    /// The track's source descriptor
    #[must_use]
    pub fn source(&self) -> &TrackSource {
        &self.source
    }

    /// Stable identifier: the URL string, or the decimal persistent id
    #[must_use]
    pub fn identifier(&self) -> String {
        match &self.source {
            TrackSource::Url(url) => url.clone(),
            TrackSource::Library { persistent_id } => persistent_id.to_string(),
        }
    }

    /// Whether the track can be played
    #[must_use]
    pub fn is_playable(&self) -> bool {
        match (&self.source, &self.media_item) {
            (TrackSource::Library { .. }, Some(item)) => item.playable,
            _ => true,
        }
    }

    /// Resolve a lazily-referenced media item through the library
    ///
    /// URL tracks and already-resolved items are left untouched.
    pub fn load_resource(&mut self, library: &dyn MediaLibrary) {
        if let TrackSource::Library { persistent_id } = self.source {
            if self.media_item.is_none() {
                self.media_item = library.media_item(persistent_id);
            }
        }
    }

    /// The resolved media item, if any
    #[must_use]
    pub fn media_item(&self) -> Option<&MediaItem> {
        self.media_item.as_ref()
    }

    /// Whether the track currently owns a playable handle
    #[must_use]
    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }

    /// The owned handle, if the track is current
    #[must_use]
    pub fn handle(&self) -> Option<&dyn PlayableHandle> {
        self.handle.as_deref()
    }

    /// Mutable access to the owned handle
    pub fn handle_mut(&mut self) -> Option<&mut (dyn PlayableHandle + 'static)> {
        self.handle.as_deref_mut()
    }

    /// Take ownership of a resolved handle and build the initial
    /// now-playing mapping
    pub fn prepare_for_playing(&mut self, handle: Box<dyn PlayableHandle>) {
        self.handle = Some(handle);
        self.init_now_playing_info();
    }

    /// Release the handle and clear the now-playing mapping
    ///
    /// Called whenever the track stops being current (replaced, advanced
    /// past, queue cleared).
    pub fn cleanup_after_playing(&mut self) {
        self.handle = None;
        self.now_playing = None;
    }

    fn init_now_playing_info(&mut self) {
        let mut info = NowPlayingInfo::new();
        match &self.source {
            TrackSource::Url(url) => {
                // Best-effort title until timed metadata arrives
                if let Some(name) = url.rsplit('/').next() {
                    if !name.is_empty() {
                        info.set(keys::TITLE, name);
                    }
                }
            }
            TrackSource::Library { .. } => {
                if let Some(item) = &self.media_item {
                    if let Some(title) = &item.title {
                        info.set(keys::TITLE, title.clone());
                    }
                    if let Some(artist) = &item.artist {
                        info.set(keys::ARTIST, artist.clone());
                    }
                    if let Some(album) = &item.album_title {
                        info.set(keys::ALBUM_TITLE, album.clone());
                    }
                    if let Some(artwork) = &item.artwork {
                        info.set(keys::ARTWORK, artwork.clone());
                    }
                }
            }
        }
        info.set(keys::PLAYBACK_DURATION, self.duration_secs());
        self.now_playing = Some(info);
    }

    /// The current now-playing mapping, present only while prepared
    #[must_use]
    pub fn now_playing(&self) -> Option<&NowPlayingInfo> {
        self.now_playing.as_ref()
    }

    /// Merge timed metadata reported by the engine into the mapping
    pub fn apply_metadata(&mut self, metadata: &TrackMetadata) {
        let Some(info) = self.now_playing.as_mut() else {
            return;
        };
        if let Some(title) = &metadata.title {
            info.set(keys::TITLE, title.clone());
        }
        if let Some(artist) = &metadata.artist {
            info.set(keys::ARTIST, artist.clone());
        }
        if let Some(album) = &metadata.album {
            info.set(keys::ALBUM_TITLE, album.clone());
        }
        if let Some(artwork) = &metadata.artwork {
            info.set(keys::ARTWORK, artwork.clone());
        }
    }

    /// Refresh the duration and elapsed-time keys from the handle
    pub fn update_now_playing_playback_time(&mut self) {
        let duration = self.duration_secs();
        let elapsed = self.current_time_secs();
        if let Some(info) = self.now_playing.as_mut() {
            info.set(keys::PLAYBACK_DURATION, duration);
            info.set(keys::ELAPSED_PLAYBACK_TIME, elapsed);
        }
    }

    /// Track duration in seconds, `0.0` while unknown
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        self.handle
            .as_ref()
            .and_then(|h| h.duration_secs())
            .unwrap_or(0.0)
    }

    /// Current playback position in seconds, `0.0` without a handle
    #[must_use]
    pub fn current_time_secs(&self) -> f64 {
        self.handle.as_ref().map_or(0.0, |h| h.position_secs())
    }

    /// Playback progress in `0.0..=1.0`, `0.0` while the duration is unknown
    #[must_use]
    pub fn current_progress(&self) -> f64 {
        let duration = self.duration_secs();
        if duration > 0.0 {
            self.current_time_secs() / duration
        } else {
            0.0
        }
    }

    /// Current position as a displayable `m:ss` / `h:mm:ss` string
    #[must_use]
    pub fn displayable_playback_time(&self) -> String {
        displayable_time(self.current_time_secs())
    }

    /// Duration as a displayable `m:ss` / `h:mm:ss` string
    #[must_use]
    pub fn displayable_duration(&self) -> String {
        displayable_time(self.duration_secs())
    }

    /// Remaining time as a displayable string prefixed with `-`
    #[must_use]
    pub fn displayable_time_left(&self) -> String {
        let left = self.duration_secs() - self.current_time_secs();
        format!("-{}", displayable_time(left))
    }

    /// Snapshot of the track for callers outside the controller lock
    #[must_use]
    pub fn info(&self) -> TrackInfo {
        TrackInfo {
            id: self.id,
            identifier: self.identifier(),
            source: self.source.clone(),
            now_playing: self.now_playing.clone(),
            position_secs: self.current_time_secs(),
            duration_secs: self.duration_secs(),
        }
    }

    // === Batch factories ===

    /// Build tracks from URL strings, skipping invalid entries
    ///
    /// Skipped entries at or before `start_index` shift the returned start
    /// index down so it keeps pointing at the same logical track.
    #[must_use]
    pub fn make_url_tracks(urls: &[String], start_index: usize) -> (Vec<Self>, usize) {
        let mut tracks = Vec::with_capacity(urls.len());
        let mut reduced_start = start_index;
        for (index, url) in urls.iter().enumerate() {
            if let Some(track) = Self::from_url(url) {
                tracks.push(track);
            } else if index <= start_index && reduced_start > 0 {
                reduced_start -= 1;
            }
        }
        (tracks, reduced_start)
    }

    /// First playable URL at or after `start_index`, with its original index
    #[must_use]
    pub fn first_playable_url(urls: &[String], start_index: usize) -> Option<(Self, usize)> {
        urls.iter()
            .enumerate()
            .skip(start_index)
            .find_map(|(index, url)| Self::from_url(url).map(|track| (track, index)))
    }

    /// Build tracks from media items, skipping unplayable entries
    ///
    /// Same start-index shifting as [`Self::make_url_tracks`].
    #[must_use]
    pub fn make_library_tracks(items: Vec<MediaItem>, start_index: usize) -> (Vec<Self>, usize) {
        let mut tracks = Vec::with_capacity(items.len());
        let mut reduced_start = start_index;
        for (index, item) in items.into_iter().enumerate() {
            if let Some(track) = Self::from_media_item(item) {
                tracks.push(track);
            } else if index <= start_index && reduced_start > 0 {
                reduced_start -= 1;
            }
        }
        (tracks, reduced_start)
    }

    /// First playable media item at or after `start_index`, with its
    /// original index
    #[must_use]
    pub fn first_playable_item(items: &[MediaItem], start_index: usize) -> Option<(Self, usize)> {
        items
            .iter()
            .enumerate()
            .skip(start_index)
            .find_map(|(index, item)| {
                Self::from_media_item(item.clone()).map(|track| (track, index))
            })
    }
}

/// Snapshot of a track handed to callers outside the controller
#[derive(Debug, Clone, PartialEq)]
pub struct TrackInfo {
    /// Track id
    pub id: TrackId,
    /// Stable identifier (URL string or persistent id)
    pub identifier: String,
    /// Source descriptor
    pub source: TrackSource,
    /// Now-playing mapping, present while the track is prepared
    pub now_playing: Option<NowPlayingInfo>,
    /// Position at snapshot time in seconds
    pub position_secs: f64,
    /// Duration in seconds, `0.0` while unknown
    pub duration_secs: f64,
}

/// Format seconds as `m:ss`, or `h:mm:ss` from one hour up
fn displayable_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url_rejects_invalid() {
        assert!(AudioTrack::from_url("https://example.com/a.mp3").is_some());
        assert!(AudioTrack::from_url("").is_none());
        assert!(AudioTrack::from_url("not a url").is_none());
        assert!(AudioTrack::from_url("missing-scheme.mp3").is_none());
    }

    #[test]
    fn test_identifier_per_source() {
        let url_track = AudioTrack::from_url("https://example.com/a.mp3").unwrap();
        assert_eq!(url_track.identifier(), "https://example.com/a.mp3");

        let library_track = AudioTrack::from_persistent_id(99);
        assert_eq!(library_track.identifier(), "99");
    }

    #[test]
    fn test_from_media_item_rejects_unplayable() {
        assert!(AudioTrack::from_media_item(MediaItem::new(1)).is_some());
        assert!(AudioTrack::from_media_item(MediaItem::new(2).unplayable()).is_none());
    }

    #[test]
    fn test_make_url_tracks_skips_and_shifts() {
        let urls = vec![
            "https://example.com/a.mp3".to_string(),
            "bad".to_string(),
            "https://example.com/b.mp3".to_string(),
        ];
        let (tracks, start) = AudioTrack::make_url_tracks(&urls, 1);
        assert_eq!(tracks.len(), 2);
        assert_eq!(start, 0);
    }

    #[test]
    fn test_make_url_tracks_skip_after_start_keeps_index() {
        let urls = vec![
            "https://example.com/a.mp3".to_string(),
            "https://example.com/b.mp3".to_string(),
            "bad".to_string(),
        ];
        let (tracks, start) = AudioTrack::make_url_tracks(&urls, 1);
        assert_eq!(tracks.len(), 2);
        assert_eq!(start, 1);
    }

    #[test]
    fn test_make_url_tracks_all_invalid() {
        let urls = vec!["bad".to_string(), "also bad".to_string()];
        let (tracks, start) = AudioTrack::make_url_tracks(&urls, 1);
        assert!(tracks.is_empty());
        assert_eq!(start, 0);
    }

    #[test]
    fn test_first_playable_url_searches_from_start_index() {
        let urls = vec![
            "https://example.com/a.mp3".to_string(),
            "bad".to_string(),
            "https://example.com/b.mp3".to_string(),
        ];
        let (track, index) = AudioTrack::first_playable_url(&urls, 1).unwrap();
        assert_eq!(index, 2);
        assert_eq!(track.identifier(), "https://example.com/b.mp3");

        assert!(AudioTrack::first_playable_url(&["bad".to_string()], 0).is_none());
    }

    #[test]
    fn test_duration_and_progress_without_handle() {
        let track = AudioTrack::from_url("https://example.com/a.mp3").unwrap();
        assert_eq!(track.duration_secs(), 0.0);
        assert_eq!(track.current_time_secs(), 0.0);
        assert_eq!(track.current_progress(), 0.0);
    }

    #[test]
    fn test_displayable_time_formats() {
        assert_eq!(displayable_time(0.0), "0:00");
        assert_eq!(displayable_time(75.4), "1:15");
        assert_eq!(displayable_time(3600.0), "1:00:00");
        assert_eq!(displayable_time(3725.0), "1:02:05");
        assert_eq!(displayable_time(-3.0), "0:00");
    }

    #[test]
    fn test_track_ids_are_unique() {
        let a = AudioTrack::from_url("https://example.com/a.mp3").unwrap();
        let b = AudioTrack::from_url("https://example.com/a.mp3").unwrap();
        assert_ne!(a.id(), b.id());
    }
}
