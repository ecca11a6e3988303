//! Controller state machine and status snapshot

use serde::{Deserialize, Serialize};

use super::track::TrackInfo;

/// Phase of the playback state machine
///
/// Whether a playback session exists is a fact of the phase, not a
/// runtime null-check: `Idle` means no session was ever created,
/// `Loading` through `Stopped` mean the controller owns one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackPhase {
    /// No playback session exists
    #[default]
    Idle,
    /// Session created, resource not yet ready
    Loading,
    /// Actively playing
    Playing,
    /// Paused mid-track
    Paused,
    /// Stopped: paused and rewound to zero, or queue cleared
    Stopped,
}

impl PlaybackPhase {
    /// Whether a transport `play()` would resume rather than no-op
    #[must_use]
    pub fn is_resumable(self) -> bool {
        matches!(self, Self::Paused | Self::Stopped | Self::Loading)
    }
}

/// Snapshot of the controller for host polling
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerStatus {
    /// Current phase
    pub phase: PlaybackPhase,
    /// Current track, if any
    pub current_track: Option<TrackInfo>,
    /// Number of tracks in the queue
    pub queue_len: usize,
    /// Queue generation at snapshot time
    pub queue_generation: u64,
}

impl PlayerStatus {
    /// Whether the controller is actively playing
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }
}
