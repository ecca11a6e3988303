//! Observer registries keyed by caller-supplied tokens

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::AudioTrack;

/// Opaque identity token for callback registration
///
/// Callers either allocate one with [`CallbackToken::unique`] or derive
/// one from their own stable numbering. Removal drops every callback
/// registered under the token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackToken(pub u64);

impl CallbackToken {
    /// Allocate a process-unique token
    #[must_use]
    pub fn unique() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Callback observing play-state transitions
pub type PlayStateCallback = Box<dyn Fn(Option<&AudioTrack>) + Send>;

/// Callback observing playback-time progress
pub type PlaybackTimeCallback = Box<dyn Fn(&AudioTrack) + Send>;

/// Both observer registries
///
/// Per token, callbacks fire in registration order; ordering across
/// tokens is unspecified.
#[derive(Default)]
pub(crate) struct CallbackRegistry {
    play_state: HashMap<CallbackToken, Vec<PlayStateCallback>>,
    playback_time: HashMap<CallbackToken, Vec<PlaybackTimeCallback>>,
}

impl CallbackRegistry {
    pub(crate) fn add_play_state(&mut self, token: CallbackToken, callback: PlayStateCallback) {
        self.play_state.entry(token).or_default().push(callback);
    }

    pub(crate) fn remove_play_state(&mut self, token: CallbackToken) {
        self.play_state.remove(&token);
    }

    pub(crate) fn add_playback_time(
        &mut self,
        token: CallbackToken,
        callback: PlaybackTimeCallback,
    ) {
        self.playback_time.entry(token).or_default().push(callback);
    }

    pub(crate) fn remove_playback_time(&mut self, token: CallbackToken) {
        self.playback_time.remove(&token);
    }

    pub(crate) fn fire_play_state(&self, current: Option<&AudioTrack>) {
        for callbacks in self.play_state.values() {
            for callback in callbacks {
                callback(current);
            }
        }
    }

    pub(crate) fn fire_playback_time(&self, current: &AudioTrack) {
        for callbacks in self.playback_time.values() {
            for callback in callbacks {
                callback(current);
            }
        }
    }
}
