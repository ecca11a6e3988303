//! Track queue with a current-position cursor
//!
//! The queue owns the ordered track list and navigation state. It never
//! talks to the playback engine; the controller drives sessions against
//! whatever the queue reports as current.

use tracing::debug;

use crate::types::{AudioTrack, TrackId};

#[cfg(test)]
mod tests;

/// Ordered track list plus current-track cursor and navigation history
///
/// Invariants:
/// - `current_index` is `Some(i)` with `i < tracks.len()` exactly while a
///   track is current; it is `None` for an empty queue and for a queue
///   grown from empty by `prepend`/`append` (nothing was ever current).
/// - Exactly one track is current at a time; only that track may hold a
///   playable handle.
/// - `prepend`/`append` never change which track is current.
#[derive(Debug, Default)]
pub struct TrackQueue {
    tracks: Vec<AudioTrack>,
    current_index: Option<usize>,
    /// Tracks that were current before a forward() or a full replace,
    /// oldest first. Append-only; rewind() deliberately does not record.
    history: Vec<TrackId>,
}

impl TrackQueue {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue's contents, or clear it
    ///
    /// With `Some(tracks)`, the outgoing current track (if any) is pushed
    /// onto the history and cleaned up, and `tracks[start_index]` becomes
    /// current. With `None`, the current track is cleaned up and the
    /// queue is emptied; this is the only full reset.
    ///
    /// # Panics
    ///
    /// Panics if `tracks` is `Some` and `start_index` is out of range —
    /// a programming error in the caller.
    pub fn replace(&mut self, tracks: Option<Vec<AudioTrack>>, start_index: usize) {
        match tracks {
            Some(tracks) => {
                assert!(
                    start_index < tracks.len(),
                    "start index {start_index} out of range for {} tracks",
                    tracks.len()
                );
                if let Some(index) = self.current_index {
                    let id = self.tracks[index].id();
                    self.tracks[index].cleanup_after_playing();
                    self.history.push(id);
                }
                debug!(count = tracks.len(), start_index, "replacing queue");
                self.tracks = tracks;
                self.current_index = Some(start_index);
            }
            None => {
                if let Some(current) = self.current_track_mut() {
                    current.cleanup_after_playing();
                }
                debug!("clearing queue");
                self.tracks.clear();
                self.current_index = None;
            }
        }
    }

    /// Insert tracks at the front, keeping the same track current
    pub fn prepend(&mut self, tracks: Vec<AudioTrack>) {
        let shift = tracks.len();
        self.tracks.splice(0..0, tracks);
        if let Some(index) = self.current_index {
            self.current_index = Some(index + shift);
        }
    }

    /// Insert tracks at the end
    pub fn append(&mut self, mut tracks: Vec<AudioTrack>) {
        self.tracks.append(&mut tracks);
    }

    /// Whether a track exists after the current one
    #[must_use]
    pub fn can_forward(&self) -> bool {
        self.current_index
            .is_some_and(|index| index + 1 < self.tracks.len())
    }

    /// Advance to the following track
    ///
    /// Cleans up the outgoing current track and records it in the
    /// history. Returns `false` without state change at the queue end.
    pub fn forward(&mut self) -> bool {
        let Some(index) = self.current_index else {
            return false;
        };
        if index + 1 >= self.tracks.len() {
            return false;
        }
        let former = &mut self.tracks[index];
        let former_id = former.id();
        former.cleanup_after_playing();
        self.current_index = Some(index + 1);
        self.history.push(former_id);
        true
    }

    /// Whether a track exists before the current one
    #[must_use]
    pub fn can_rewind(&self) -> bool {
        self.current_index.is_some_and(|index| index > 0)
    }

    /// Retreat to the preceding track
    ///
    /// Cleans up the outgoing current track. Unlike [`Self::forward`],
    /// this does not record history: the history tracks forward progress
    /// only. Returns `false` without state change at the queue start.
    pub fn rewind(&mut self) -> bool {
        let Some(index) = self.current_index else {
            return false;
        };
        if index == 0 {
            return false;
        }
        self.tracks[index].cleanup_after_playing();
        self.current_index = Some(index - 1);
        true
    }

    /// Number of tracks in the queue
    #[must_use]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Whether the queue holds no tracks
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// The current track
    #[must_use]
    pub fn current_track(&self) -> Option<&AudioTrack> {
        self.current_index.and_then(|index| self.tracks.get(index))
    }

    /// Mutable access to the current track
    pub fn current_track_mut(&mut self) -> Option<&mut AudioTrack> {
        self.current_index
            .and_then(|index| self.tracks.get_mut(index))
    }

    /// Read-only peek at the track before the current one
    #[must_use]
    pub fn previous_track(&self) -> Option<&AudioTrack> {
        let index = self.current_index?;
        if index == 0 {
            return None;
        }
        self.tracks.get(index - 1)
    }

    /// Index of the current track, if any
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Ids of previously current tracks, oldest first
    #[must_use]
    pub fn history(&self) -> &[TrackId] {
        &self.history
    }

    /// Track at an index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AudioTrack> {
        self.tracks.get(index)
    }
}
