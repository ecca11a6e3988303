//! Playback controller
//!
//! [`PlayerManager`] drives one playback session at a time against the
//! queue's current track, owns the queue-generation protocol for
//! asynchronous queue completion, and fans state changes out to
//! registered observers. There is no implicit shared instance; hosts
//! that want one hold their own.

mod callbacks;


pub use callbacks::{CallbackToken, PlayStateCallback, PlaybackTimeCallback};

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};

use crate::engine::{MediaItem, MediaLibrary, NowPlayingSink, PlaybackEngine, RemoteCommand};
use crate::queue::TrackQueue;
use crate::types::{
    AudioTrack, PlaybackPhase, PlayerConfig, PlayerStatus, TrackId, TrackInfo, TrackMetadata,
};
use callbacks::CallbackRegistry;

/// A track is restarted instead of rewound past when playback is beyond
/// this position; a second press within the window goes to the previous
/// track.
const REWIND_THRESHOLD_SECS: f64 = 1.0;

/// Transport controller over a [`TrackQueue`] and a pluggable engine
///
/// Cheap to clone; clones share the same state. All methods take `&self`
/// and recover from boundary conditions locally — nothing on this
/// surface returns an error.
///
/// Registered callbacks run inside the controller's critical section and
/// must not call back into the controller synchronously; they should
/// record what they observed and schedule any follow-up work.
#[derive(Clone)]
pub struct PlayerManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    config: PlayerConfig,
    engine: Arc<dyn PlaybackEngine>,
    now_playing: Option<Arc<dyn NowPlayingSink>>,
    media_library: Option<Arc<dyn MediaLibrary>>,
    state: Mutex<PlayerState>,
    callbacks: StdMutex<CallbackRegistry>,
    /// Shutdown signal for the running refresh task, if any
    refresh_stop: StdMutex<Option<watch::Sender<bool>>>,
}

struct PlayerState {
    queue: TrackQueue,
    phase: PlaybackPhase,
    /// Bumped on every full queue replace; stale prepend/append carry the
    /// generation they targeted and are discarded on mismatch.
    queue_generation: u64,
    /// Stamp allocator for playback sessions
    session_seq: u64,
    /// Stamp of the session engine callbacks are currently valid for
    active_session: Option<u64>,
}

impl PlayerManager {
    /// Create a controller with the default configuration
    #[must_use]
    pub fn new(engine: Arc<dyn PlaybackEngine>) -> Self {
        Self::builder(engine).build()
    }

    /// Create a builder for a customized controller
    #[must_use]
    pub fn builder(engine: Arc<dyn PlaybackEngine>) -> PlayerManagerBuilder {
        PlayerManagerBuilder {
            config: PlayerConfig::default(),
            engine,
            now_playing: None,
            media_library: None,
        }
    }

    // === Transport ===

    /// Replace the queue with `tracks` and start playing at `start_index`
    ///
    /// An empty batch is a logged no-op. The active session (if any) is
    /// stopped, the queue generation is bumped, and a new session is
    /// created for the track at `start_index`.
    ///
    /// # Panics
    ///
    /// Panics if `start_index` is out of range for a non-empty batch —
    /// a programming error in the caller.
    pub async fn play_tracks(&self, tracks: Vec<AudioTrack>, start_index: usize) {
        if tracks.is_empty() {
            warn!("ignoring play request with an empty track batch");
            return;
        }
        debug!(count = tracks.len(), start_index, "play");
        self.stop(false).await;
        {
            let mut state = self.inner.state.lock().await;
            state.queue.replace(Some(tracks), start_index);
            state.queue_generation += 1;
        }
        self.restart_current_track().await;
    }

    /// Replace the queue with a single track and play it
    pub async fn play_track(&self, track: AudioTrack) {
        self.play_tracks(vec![track], 0).await;
    }

    /// Resume playback of the current session
    ///
    /// No-op without a prepared session.
    pub async fn play(&self) {
        let mut state = self.inner.state.lock().await;
        self.play_now(&mut state, false);
    }

    /// Pause playback
    ///
    /// Stops the time refresh but fires one final playback-time callback
    /// so observers see the pause instant. Safe no-op without a session.
    pub async fn pause(&self) {
        let mut state = self.inner.state.lock().await;
        let Some(handle) = state
            .queue
            .current_track_mut()
            .and_then(|track| track.handle_mut())
        else {
            return;
        };
        handle.pause();
        state.phase = PlaybackPhase::Paused;
        self.stop_refresh_timer();
        self.update_now_playing(&mut state);
        self.fire_playback_time(&state);
        self.fire_play_state(&state);
    }

    /// Toggle between playing and paused
    pub async fn toggle_play_pause(&self) {
        if self.is_playing().await {
            self.pause().await;
        } else {
            self.play().await;
        }
    }

    /// Stop playback
    ///
    /// Seeks the session to zero and pauses it, or tears everything down
    /// and resets the queue when `clear_queue` is set. Idempotent: when
    /// already stopped only the queue clearing (if requested) has effect.
    pub async fn stop(&self, clear_queue: bool) {
        let mut state = self.inner.state.lock().await;
        if state.phase == PlaybackPhase::Stopped {
            if clear_queue {
                self.clear_queue_locked(&mut state);
            }
            return;
        }
        if clear_queue {
            self.clear_queue_locked(&mut state);
        } else if let Some(handle) = state
            .queue
            .current_track_mut()
            .and_then(|track| track.handle_mut())
        {
            handle.seek(0.0);
            handle.pause();
        }
        state.phase = PlaybackPhase::Stopped;
        self.stop_refresh_timer();
        self.update_now_playing(&mut state);
        self.fire_play_state(&state);
        self.fire_playback_time(&state);
    }

    /// Advance to the next track
    ///
    /// Stops the current session; when the queue can advance, a new
    /// session is built for the new current track.
    pub async fn forward(&self) {
        self.stop(false).await;
        let advanced = {
            let mut state = self.inner.state.lock().await;
            state.queue.forward()
        };
        if advanced {
            self.restart_current_track().await;
        }
    }

    /// Go back: to the previous track, or to the start of the current one
    ///
    /// Within the first second of a track a queue rewind moves to the
    /// prior track; beyond it the current track restarts from zero. This
    /// gives the standard double-press-for-previous behavior.
    pub async fn rewind(&self) {
        enum Decision {
            Stop,
            Previous,
            Restart,
        }

        let decision = {
            let state = self.inner.state.lock().await;
            match state.queue.current_track() {
                None => Decision::Stop,
                Some(track)
                    if track.current_time_secs() <= REWIND_THRESHOLD_SECS
                        && state.queue.can_rewind() =>
                {
                    Decision::Previous
                }
                Some(_) => Decision::Restart,
            }
        };

        match decision {
            Decision::Stop => self.stop(false).await,
            Decision::Previous => {
                self.stop(false).await;
                let rewound = {
                    let mut state = self.inner.state.lock().await;
                    state.queue.rewind()
                };
                if rewound {
                    self.restart_current_track().await;
                }
            }
            Decision::Restart => {
                let mut state = self.inner.state.lock().await;
                if let Some(handle) = state
                    .queue
                    .current_track_mut()
                    .and_then(|track| track.handle_mut())
                {
                    handle.seek(0.0);
                }
                self.update_now_playing(&mut state);
                self.fire_playback_time(&state);
            }
        }
    }

    /// Seek to an absolute position in seconds
    pub async fn seek_to_time(&self, seconds: f64) {
        let mut state = self.inner.state.lock().await;
        if let Some(handle) = state
            .queue
            .current_track_mut()
            .and_then(|track| track.handle_mut())
        {
            handle.seek(seconds);
        }
    }

    /// Seek to a fraction of the current track's duration
    ///
    /// An unknown duration counts as zero, making this a seek to the
    /// track start.
    pub async fn seek_to_progress(&self, progress: f64) {
        let target = {
            let state = self.inner.state.lock().await;
            state
                .queue
                .current_track()
                .map_or(0.0, |track| progress * track.duration_secs())
        };
        self.seek_to_time(target).await;
    }

    // === Generation-checked queue completion ===

    /// Current queue generation
    ///
    /// Capture this before constructing tracks in the background and pass
    /// it to [`Self::prepend`] / [`Self::append`] with the result.
    pub async fn queue_generation(&self) -> u64 {
        self.inner.state.lock().await.queue_generation
    }

    /// Insert tracks at the front of the queue the given generation targeted
    ///
    /// Discarded silently when the queue has been replaced since the
    /// generation was captured.
    pub async fn prepend(&self, tracks: Vec<AudioTrack>, generation: u64) {
        if tracks.is_empty() {
            return;
        }
        let mut state = self.inner.state.lock().await;
        if state.queue_generation == generation {
            debug!(generation, count = tracks.len(), "prepending to queue");
            state.queue.prepend(tracks);
            self.fire_play_state(&state);
        } else {
            debug!(
                stale = generation,
                current = state.queue_generation,
                count = tracks.len(),
                "discarding stale prepend"
            );
        }
    }

    /// Append tracks to the queue the given generation targeted
    ///
    /// Discarded silently when the queue has been replaced since the
    /// generation was captured.
    pub async fn append(&self, tracks: Vec<AudioTrack>, generation: u64) {
        if tracks.is_empty() {
            return;
        }
        let mut state = self.inner.state.lock().await;
        if state.queue_generation == generation {
            debug!(generation, count = tracks.len(), "appending to queue");
            state.queue.append(tracks);
            self.fire_play_state(&state);
        } else {
            debug!(
                stale = generation,
                current = state.queue_generation,
                count = tracks.len(),
                "discarding stale append"
            );
        }
    }

    // === URL / media-library convenience ===

    /// Play a single URL
    ///
    /// Invalid URLs are a logged no-op.
    pub async fn play_url(&self, url: &str) {
        match AudioTrack::from_url(url) {
            Some(track) => self.play_track(track).await,
            None => warn!(url, "ignoring invalid URL"),
        }
    }

    /// Play a batch of URLs starting at `start_index`
    ///
    /// The first playable URL at or after `start_index` starts playing
    /// immediately; the remaining entries are turned into tracks on a
    /// background task and handed back through the generation-checked
    /// queue mutations, so a later `play` cannot be polluted by them.
    pub async fn play_urls(&self, urls: &[String], start_index: usize) {
        let Some((first, index)) = AudioTrack::first_playable_url(urls, start_index) else {
            warn!(count = urls.len(), "no playable URL in batch");
            return;
        };
        self.play_track(first).await;
        let generation = self.queue_generation().await;
        let to_prepend = urls[..index].to_vec();
        let to_append = urls[index + 1..].to_vec();
        let manager = self.clone();
        tokio::spawn(async move {
            let (prepend_tracks, _) = AudioTrack::make_url_tracks(&to_prepend, 0);
            let (append_tracks, _) = AudioTrack::make_url_tracks(&to_append, 0);
            manager.prepend(prepend_tracks, generation).await;
            manager.append(append_tracks, generation).await;
        });
    }

    /// Play a batch of media items starting at `start_index`
    ///
    /// Same split as [`Self::play_urls`]: first playable item starts
    /// immediately, the rest complete the queue in the background.
    pub async fn play_media_items(&self, items: Vec<MediaItem>, start_index: usize) {
        let Some((first, index)) = AudioTrack::first_playable_item(&items, start_index) else {
            warn!(count = items.len(), "no playable media item in batch");
            return;
        };
        self.play_track(first).await;
        let generation = self.queue_generation().await;
        let to_prepend: Vec<MediaItem> = items[..index].to_vec();
        let to_append: Vec<MediaItem> = items[index + 1..].to_vec();
        let manager = self.clone();
        tokio::spawn(async move {
            let (prepend_tracks, _) = AudioTrack::make_library_tracks(to_prepend, 0);
            let (append_tracks, _) = AudioTrack::make_library_tracks(to_append, 0);
            manager.prepend(prepend_tracks, generation).await;
            manager.append(append_tracks, generation).await;
        });
    }

    // === Queries ===

    /// Whether the queue holds anything to play
    pub async fn can_play(&self) -> bool {
        !self.inner.state.lock().await.queue.is_empty()
    }

    /// Whether a track exists after the current one
    pub async fn can_forward(&self) -> bool {
        self.inner.state.lock().await.queue.can_forward()
    }

    /// Whether a rewind would do anything
    ///
    /// True when the current track has played beyond the restart
    /// threshold, or the queue has a previous track.
    pub async fn can_rewind(&self) -> bool {
        let state = self.inner.state.lock().await;
        match state.queue.current_track() {
            None => false,
            Some(track) => {
                track.current_time_secs() > REWIND_THRESHOLD_SECS || state.queue.can_rewind()
            }
        }
    }

    /// Whether playback is active
    pub async fn is_playing(&self) -> bool {
        self.inner.state.lock().await.phase == PlaybackPhase::Playing
    }

    /// Whether the track with the given identifier is playing right now
    pub async fn is_playing_source(&self, identifier: &str) -> bool {
        let state = self.inner.state.lock().await;
        state.phase == PlaybackPhase::Playing
            && state
                .queue
                .current_track()
                .is_some_and(|track| track.identifier() == identifier)
    }

    /// Snapshot of the current track
    pub async fn current_track_info(&self) -> Option<TrackInfo> {
        self.inner
            .state
            .lock()
            .await
            .queue
            .current_track()
            .map(AudioTrack::info)
    }

    /// Number of tracks in the queue
    pub async fn queue_len(&self) -> usize {
        self.inner.state.lock().await.queue.len()
    }

    /// Ids of previously current tracks, oldest first
    pub async fn history(&self) -> Vec<TrackId> {
        self.inner.state.lock().await.queue.history().to_vec()
    }

    /// Full status snapshot
    pub async fn status(&self) -> PlayerStatus {
        let state = self.inner.state.lock().await;
        PlayerStatus {
            phase: state.phase,
            current_track: state.queue.current_track().map(AudioTrack::info),
            queue_len: state.queue.len(),
            queue_generation: state.queue_generation,
        }
    }

    // === Observation ===

    /// Register a play-state callback under a token
    pub fn add_play_state_callback(&self, token: CallbackToken, callback: PlayStateCallback) {
        self.registry().add_play_state(token, callback);
    }

    /// Remove every play-state callback registered under a token
    pub fn remove_play_state_callback(&self, token: CallbackToken) {
        self.registry().remove_play_state(token);
    }

    /// Register a playback-time callback under a token
    pub fn add_playback_time_callback(&self, token: CallbackToken, callback: PlaybackTimeCallback) {
        self.registry().add_playback_time(token, callback);
    }

    /// Remove every playback-time callback registered under a token
    pub fn remove_playback_time_callback(&self, token: CallbackToken) {
        self.registry().remove_playback_time(token);
    }

    // === Remote control ===

    /// Dispatch a remote-control command to the matching transport
    /// operation
    ///
    /// Ignored when `consume_remote_control_events` is disabled.
    pub async fn handle_remote_command(&self, command: RemoteCommand) {
        if !self.inner.config.consume_remote_control_events {
            debug!(?command, "remote control events disabled");
            return;
        }
        match command {
            RemoteCommand::Play => self.play().await,
            RemoteCommand::Pause => self.pause().await,
            RemoteCommand::TogglePlayPause => self.toggle_play_pause().await,
            RemoteCommand::NextTrack => self.forward().await,
            RemoteCommand::PreviousTrack => self.rewind().await,
        }
    }

    // === Session lifecycle ===

    /// Build a fresh playback session for the queue's current track
    ///
    /// The engine resolve runs outside the critical section; the session
    /// stamp taken before it guards against the queue having moved on by
    /// the time the handle arrives.
    async fn restart_current_track(&self) {
        let (session, source) = {
            let mut state = self.inner.state.lock().await;
            let library = self.inner.media_library.clone();
            let Some(track) = state.queue.current_track_mut() else {
                return;
            };
            if let Some(library) = &library {
                track.load_resource(library.as_ref());
            }
            if !track.is_playable() {
                warn!(identifier = %track.identifier(), "current track reports unplayable");
            }
            let source = track.source().clone();
            state.session_seq += 1;
            let session = state.session_seq;
            state.active_session = Some(session);
            state.phase = PlaybackPhase::Loading;
            (session, source)
        };

        debug!(session, source = %source, "starting playback session");
        match self.inner.engine.resolve(&source).await {
            Ok(mut handle) => {
                // The handle ends up owned by the state these callbacks
                // re-enter; weak captures keep that from becoming a cycle.
                let weak = Arc::downgrade(&self.inner);
                handle.set_ready_callback(Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        let manager = PlayerManager { inner };
                        tokio::spawn(async move { manager.on_session_ready(session).await });
                    }
                }));
                let weak = Arc::downgrade(&self.inner);
                handle.set_ended_callback(Box::new(move || {
                    if let Some(inner) = weak.upgrade() {
                        let manager = PlayerManager { inner };
                        tokio::spawn(async move { manager.on_session_ended(session).await });
                    }
                }));
                let weak = Arc::downgrade(&self.inner);
                handle.set_metadata_callback(Box::new(move |metadata| {
                    if let Some(inner) = weak.upgrade() {
                        let manager = PlayerManager { inner };
                        tokio::spawn(
                            async move { manager.on_session_metadata(session, metadata).await },
                        );
                    }
                }));

                let mut state = self.inner.state.lock().await;
                if state.active_session == Some(session) {
                    if let Some(track) = state.queue.current_track_mut() {
                        track.prepare_for_playing(handle);
                        return;
                    }
                }
                debug!(session, "dropping handle for superseded session");
            }
            Err(error) => {
                warn!(session, %error, "engine failed to resolve track source");
                let mut state = self.inner.state.lock().await;
                if state.active_session == Some(session) {
                    state.active_session = None;
                    state.phase = PlaybackPhase::Stopped;
                    self.fire_play_state(&state);
                }
            }
        }
    }

    /// The engine reports the session's resource ready to play
    async fn on_session_ready(&self, session: u64) {
        let mut state = self.inner.state.lock().await;
        if state.active_session != Some(session) {
            debug!(session, "ignoring ready signal for stale session");
            return;
        }
        self.play_now(&mut state, true);
    }

    /// The engine reports the session reached the end of its track
    async fn on_session_ended(&self, session: u64) {
        {
            let state = self.inner.state.lock().await;
            if state.active_session != Some(session) {
                debug!(session, "ignoring ended signal for stale session");
                return;
            }
        }
        self.forward_boxed().await;
    }

    /// Type-erased `forward`
    ///
    /// End-of-track re-enters the transport, and the transport in turn
    /// registers the end-of-track callback; boxing here keeps the future
    /// types finite across that loop.
    fn forward_boxed(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(self.forward())
    }

    /// The engine delivered timed metadata for the session
    async fn on_session_metadata(&self, session: u64, metadata: TrackMetadata) {
        let mut state = self.inner.state.lock().await;
        if state.active_session != Some(session) {
            debug!(session, "ignoring metadata for stale session");
            return;
        }
        if let Some(track) = state.queue.current_track_mut() {
            track.apply_metadata(&metadata);
        }
        self.fire_play_state(&state);
    }

    // === Internals ===

    /// Start the prepared session and enter `Playing`
    fn play_now(&self, state: &mut PlayerState, update_now_playing: bool) {
        let was_stopped = state.phase == PlaybackPhase::Stopped;
        {
            let Some(handle) = state
                .queue
                .current_track_mut()
                .and_then(|track| track.handle_mut())
            else {
                return;
            };
            handle.start();
        }
        state.phase = PlaybackPhase::Playing;
        if update_now_playing || was_stopped {
            self.update_now_playing(state);
        }
        self.start_refresh_timer();
        self.fire_play_state(state);
    }

    fn clear_queue_locked(&self, state: &mut PlayerState) {
        state.queue.replace(None, 0);
        state.queue_generation += 1;
        state.active_session = None;
    }

    /// Publish the current track's mapping (or `None`) to the sink
    fn update_now_playing(&self, state: &mut PlayerState) {
        if !self.inner.config.publish_now_playing_info {
            return;
        }
        let Some(sink) = &self.inner.now_playing else {
            return;
        };
        match state.queue.current_track_mut() {
            Some(track) => {
                track.update_now_playing_playback_time();
                sink.publish(track.now_playing());
            }
            None => sink.publish(None),
        }
    }

    fn fire_play_state(&self, state: &PlayerState) {
        self.registry().fire_play_state(state.queue.current_track());
    }

    fn fire_playback_time(&self, state: &PlayerState) {
        if let Some(track) = state.queue.current_track() {
            self.registry().fire_playback_time(track);
        }
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, CallbackRegistry> {
        self.inner
            .callbacks
            .lock()
            .expect("callback registry lock poisoned")
    }

    /// Spawn the periodic playback-time refresh if not already running
    fn start_refresh_timer(&self) {
        let mut guard = self
            .inner
            .refresh_stop
            .lock()
            .expect("refresh timer lock poisoned");
        if guard.is_some() {
            return;
        }
        let (tx, mut rx) = watch::channel(false);
        *guard = Some(tx);
        drop(guard);

        // Weak so a dropped controller takes its ticker with it
        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.config.refresh_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = rx.changed() => break,
                    _ = ticker.tick() => {}
                }
                let Some(inner) = weak.upgrade() else { break };
                PlayerManager { inner }.refresh_playback_time().await;
            }
        });
    }

    fn stop_refresh_timer(&self) {
        let stop = self
            .inner
            .refresh_stop
            .lock()
            .expect("refresh timer lock poisoned")
            .take();
        if let Some(tx) = stop {
            let _ = tx.send(true);
        }
    }

    /// One refresh tick: update now-playing and fan out time callbacks
    async fn refresh_playback_time(&self) {
        let mut state = self.inner.state.lock().await;
        if state.phase != PlaybackPhase::Playing {
            return;
        }
        self.update_now_playing(&mut state);
        self.fire_playback_time(&state);
    }
}

/// Builder for [`PlayerManager`]
pub struct PlayerManagerBuilder {
    config: PlayerConfig,
    engine: Arc<dyn PlaybackEngine>,
    now_playing: Option<Arc<dyn NowPlayingSink>>,
    media_library: Option<Arc<dyn MediaLibrary>>,
}

impl PlayerManagerBuilder {
    /// Set the configuration
    #[must_use]
    pub fn config(mut self, config: PlayerConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a now-playing sink
    #[must_use]
    pub fn now_playing_sink(mut self, sink: Arc<dyn NowPlayingSink>) -> Self {
        self.now_playing = Some(sink);
        self
    }

    /// Attach a media library for resolving library-backed tracks
    #[must_use]
    pub fn media_library(mut self, library: Arc<dyn MediaLibrary>) -> Self {
        self.media_library = Some(library);
        self
    }

    /// Build the controller
    #[must_use]
    pub fn build(self) -> PlayerManager {
        PlayerManager {
            inner: Arc::new(ManagerInner {
                config: self.config,
                engine: self.engine,
                now_playing: self.now_playing,
                media_library: self.media_library,
                state: Mutex::new(PlayerState {
                    queue: TrackQueue::new(),
                    phase: PlaybackPhase::Idle,
                    queue_generation: 0,
                    session_seq: 0,
                    active_session: None,
                }),
                callbacks: StdMutex::new(CallbackRegistry::default()),
                refresh_stop: StdMutex::new(None),
            }),
        }
    }
}
