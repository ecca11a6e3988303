//! In-memory collaborators for tests and examples
//!
//! A scripted engine, a drivable handle, a recording now-playing sink and
//! a fixed media library. They implement the traits in [`crate::engine`]
//! without any real audio backend, so controller behavior can be tested
//! deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::engine::{
    HandleCallback, MediaItem, MediaLibrary, MetadataCallback, NowPlayingSink, PlayableHandle,
    PlaybackEngine,
};
use crate::error::{PlayerError, Result};
use crate::types::{AudioTrack, NowPlayingInfo, TrackMetadata, TrackSource};

/// Yield to the executor so spawned controller tasks can run
///
/// Engine callbacks hand work back to the controller through spawned
/// tasks; tests call this between a trigger and its assertions.
pub async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Build a URL track for tests
///
/// # Panics
///
/// Panics if `name` produces an invalid URL.
#[must_use]
pub fn test_track(name: &str) -> AudioTrack {
    AudioTrack::from_url(&format!("https://example.com/{name}.mp3"))
        .expect("test URL is valid")
}

#[derive(Default)]
struct HandleShared {
    position: f64,
    duration: Option<f64>,
    playing: bool,
    seeks: Vec<f64>,
    ready: Option<HandleCallback>,
    ended: Option<HandleCallback>,
    metadata: Option<MetadataCallback>,
}

/// Handle produced by [`MockEngine`]
struct MockHandle {
    shared: Arc<Mutex<HandleShared>>,
}

impl PlayableHandle for MockHandle {
    fn position_secs(&self) -> f64 {
        self.shared.lock().unwrap().position
    }

    fn duration_secs(&self) -> Option<f64> {
        self.shared.lock().unwrap().duration
    }

    fn seek(&mut self, seconds: f64) {
        let mut shared = self.shared.lock().unwrap();
        shared.position = seconds;
        shared.seeks.push(seconds);
    }

    fn start(&mut self) {
        self.shared.lock().unwrap().playing = true;
    }

    fn pause(&mut self) {
        self.shared.lock().unwrap().playing = false;
    }

    fn set_ready_callback(&mut self, callback: HandleCallback) {
        self.shared.lock().unwrap().ready = Some(callback);
    }

    fn set_ended_callback(&mut self, callback: HandleCallback) {
        self.shared.lock().unwrap().ended = Some(callback);
    }

    fn set_metadata_callback(&mut self, callback: MetadataCallback) {
        self.shared.lock().unwrap().metadata = Some(callback);
    }
}

/// Test-side driver for a handle resolved by [`MockEngine`]
///
/// Lets a test move the simulated playhead and fire the engine's
/// readiness, end-of-track and metadata callbacks.
#[derive(Clone)]
pub struct MockHandleControl {
    shared: Arc<Mutex<HandleShared>>,
}

impl MockHandleControl {
    /// Set the simulated playback position
    pub fn set_position(&self, seconds: f64) {
        self.shared.lock().unwrap().position = seconds;
    }

    /// Set the simulated track duration
    pub fn set_duration(&self, seconds: f64) {
        self.shared.lock().unwrap().duration = Some(seconds);
    }

    /// Whether the handle was started and not paused since
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.shared.lock().unwrap().playing
    }

    /// The most recent seek target, if any
    #[must_use]
    pub fn last_seek(&self) -> Option<f64> {
        self.shared.lock().unwrap().seeks.last().copied()
    }

    /// Every seek target in order
    #[must_use]
    pub fn seeks(&self) -> Vec<f64> {
        self.shared.lock().unwrap().seeks.clone()
    }

    /// Fire the registered ready callback, if any
    pub fn trigger_ready(&self) {
        let shared = self.shared.lock().unwrap();
        if let Some(callback) = &shared.ready {
            callback();
        }
    }

    /// Fire the registered ended callback, if any
    pub fn trigger_ended(&self) {
        let shared = self.shared.lock().unwrap();
        if let Some(callback) = &shared.ended {
            callback();
        }
    }

    /// Fire the registered metadata callback, if any
    pub fn trigger_metadata(&self, metadata: TrackMetadata) {
        let shared = self.shared.lock().unwrap();
        if let Some(callback) = &shared.metadata {
            callback(metadata);
        }
    }
}

#[derive(Default)]
struct EngineInner {
    fail_substrings: Vec<String>,
    resolved: Vec<String>,
    controls: Vec<MockHandleControl>,
}

/// Scripted [`PlaybackEngine`]
///
/// Resolves every source into a [`MockHandleControl`]-driven handle,
/// except sources whose descriptor contains a scripted failure substring.
#[derive(Default)]
pub struct MockEngine {
    inner: Mutex<EngineInner>,
}

impl MockEngine {
    /// Create an engine that resolves everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail future resolves whose source descriptor contains `substring`
    pub fn fail_matching(&self, substring: impl Into<String>) {
        self.inner
            .lock()
            .unwrap()
            .fail_substrings
            .push(substring.into());
    }

    /// Number of successful resolves so far
    #[must_use]
    pub fn resolve_count(&self) -> usize {
        self.inner.lock().unwrap().resolved.len()
    }

    /// Descriptors of successfully resolved sources, in order
    #[must_use]
    pub fn resolved_sources(&self) -> Vec<String> {
        self.inner.lock().unwrap().resolved.clone()
    }

    /// Control for the `index`-th successful resolve
    #[must_use]
    pub fn control(&self, index: usize) -> Option<MockHandleControl> {
        self.inner.lock().unwrap().controls.get(index).cloned()
    }

    /// Control for the most recent successful resolve
    #[must_use]
    pub fn last_control(&self) -> Option<MockHandleControl> {
        self.inner.lock().unwrap().controls.last().cloned()
    }
}

#[async_trait]
impl PlaybackEngine for MockEngine {
    async fn resolve(&self, source: &TrackSource) -> Result<Box<dyn PlayableHandle>> {
        let descriptor = source.to_string();
        let mut inner = self.inner.lock().unwrap();
        if inner
            .fail_substrings
            .iter()
            .any(|substring| descriptor.contains(substring.as_str()))
        {
            return Err(PlayerError::UnresolvableSource {
                identifier: descriptor,
                reason: "scripted failure".to_string(),
            });
        }
        let shared = Arc::new(Mutex::new(HandleShared::default()));
        inner.controls.push(MockHandleControl {
            shared: Arc::clone(&shared),
        });
        inner.resolved.push(descriptor);
        Ok(Box::new(MockHandle { shared }))
    }
}

/// [`NowPlayingSink`] that records every published mapping
#[derive(Default)]
pub struct RecordingSink {
    published: Mutex<Vec<Option<NowPlayingInfo>>>,
}

impl RecordingSink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, in order
    #[must_use]
    pub fn published(&self) -> Vec<Option<NowPlayingInfo>> {
        self.published.lock().unwrap().clone()
    }

    /// The most recent publication, if any
    #[must_use]
    pub fn last(&self) -> Option<Option<NowPlayingInfo>> {
        self.published.lock().unwrap().last().cloned()
    }

    /// Number of publications so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    /// Whether nothing has been published yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.published.lock().unwrap().is_empty()
    }
}

impl NowPlayingSink for RecordingSink {
    fn publish(&self, info: Option<&NowPlayingInfo>) {
        self.published.lock().unwrap().push(info.cloned());
    }
}

/// [`MediaLibrary`] backed by a fixed set of items
#[derive(Default)]
pub struct StaticMediaLibrary {
    items: HashMap<u64, MediaItem>,
}

impl StaticMediaLibrary {
    /// Create an empty library
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add an item
    #[must_use]
    pub fn with_item(mut self, item: MediaItem) -> Self {
        self.items.insert(item.persistent_id, item);
        self
    }
}

impl MediaLibrary for StaticMediaLibrary {
    fn media_item(&self, persistent_id: u64) -> Option<MediaItem> {
        self.items.get(&persistent_id).cloned()
    }
}
