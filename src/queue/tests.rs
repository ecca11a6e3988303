use proptest::prelude::*;

use super::TrackQueue;
use crate::types::AudioTrack;

fn track(name: &str) -> AudioTrack {
    AudioTrack::from_url(&format!("https://example.com/{name}.mp3"))
        .expect("test URL is valid")
}

fn tracks(names: &[&str]) -> Vec<AudioTrack> {
    names.iter().map(|name| track(name)).collect()
}

fn identifier(queue: &TrackQueue) -> Option<String> {
    queue.current_track().map(AudioTrack::identifier)
}

#[test]
fn test_new_queue_is_empty() {
    let queue = TrackQueue::new();
    assert!(queue.is_empty());
    assert!(queue.current_track().is_none());
    assert!(queue.previous_track().is_none());
    assert!(!queue.can_forward());
    assert!(!queue.can_rewind());
}

#[test]
fn test_replace_sets_current_to_start_index() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a", "b", "c"])), 1);

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.current_index(), Some(1));
    assert_eq!(identifier(&queue).unwrap(), "https://example.com/b.mp3");
}

#[test]
#[should_panic(expected = "start index 3 out of range")]
fn test_replace_panics_on_out_of_range_start() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a", "b"])), 3);
}

#[test]
fn test_replace_records_outgoing_current_in_history() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a"])), 0);
    let first_id = queue.current_track().unwrap().id();

    queue.replace(Some(tracks(&["b"])), 0);
    assert_eq!(queue.history(), &[first_id]);
}

#[test]
fn test_replace_none_clears_everything() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a", "b"])), 0);
    queue.replace(None, 0);

    assert!(queue.is_empty());
    assert!(queue.current_track().is_none());
    assert_eq!(queue.current_index(), None);
}

#[test]
fn test_prepend_shifts_cursor_to_keep_current() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["c", "d"])), 1);
    let current_before = queue.current_track().unwrap().id();

    queue.prepend(tracks(&["a", "b"]));

    assert_eq!(queue.len(), 4);
    assert_eq!(queue.current_index(), Some(3));
    assert_eq!(queue.current_track().unwrap().id(), current_before);
    // History untouched by prepend
    assert!(queue.history().is_empty());
}

#[test]
fn test_append_does_not_move_cursor() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a", "b"])), 0);
    queue.append(tracks(&["c"]));

    assert_eq!(queue.len(), 3);
    assert_eq!(queue.current_index(), Some(0));
    assert!(queue.can_forward());
}

#[test]
fn test_grow_from_empty_has_no_current() {
    let mut queue = TrackQueue::new();
    queue.prepend(tracks(&["a"]));
    queue.append(tracks(&["b"]));

    assert_eq!(queue.len(), 2);
    assert!(queue.current_track().is_none());
    assert!(!queue.can_forward());
    assert!(!queue.can_rewind());
    assert!(!queue.forward());
    assert!(!queue.rewind());
}

#[test]
fn test_forward_advances_and_records_history() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a", "b"])), 0);
    let former_id = queue.current_track().unwrap().id();

    assert!(queue.forward());
    assert_eq!(queue.current_index(), Some(1));
    assert_eq!(identifier(&queue).unwrap(), "https://example.com/b.mp3");
    assert_eq!(queue.history(), &[former_id]);
}

#[test]
fn test_forward_at_end_is_a_no_op() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a", "b"])), 1);

    assert!(!queue.can_forward());
    assert!(!queue.forward());
    assert_eq!(queue.current_index(), Some(1));
    assert!(queue.history().is_empty());
}

#[test]
fn test_rewind_at_start_is_a_no_op() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a", "b"])), 0);

    assert!(!queue.can_rewind());
    assert!(!queue.rewind());
    assert_eq!(queue.current_index(), Some(0));
}

#[test]
fn test_forward_then_rewind_restores_current_but_not_history() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a", "b"])), 0);
    let original = queue.current_track().unwrap().id();

    assert!(queue.forward());
    assert!(queue.rewind());

    // Same current track as before the round trip...
    assert_eq!(queue.current_track().unwrap().id(), original);
    // ...but the forward() leg left its mark in the history, and the
    // rewind() leg deliberately did not.
    assert_eq!(queue.history(), &[original]);
}

#[test]
fn test_forward_cleans_up_outgoing_track() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a", "b"])), 0);

    assert!(queue.forward());
    assert!(!queue.get(0).unwrap().has_handle());
    assert!(queue.get(0).unwrap().now_playing().is_none());
}

#[test]
fn test_previous_track_peek_does_not_mutate() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a", "b"])), 1);

    let previous = queue.previous_track().map(AudioTrack::identifier);
    assert_eq!(previous.unwrap(), "https://example.com/a.mp3");
    assert_eq!(queue.current_index(), Some(1));
}

#[test]
fn test_history_accumulates_across_forwards() {
    let mut queue = TrackQueue::new();
    queue.replace(Some(tracks(&["a", "b", "c"])), 0);
    let id_a = queue.current_track().unwrap().id();

    assert!(queue.forward());
    let id_b = queue.current_track().unwrap().id();
    assert!(queue.forward());

    assert_eq!(queue.history(), &[id_a, id_b]);
}

/// One queue operation for the random-walk invariant test
#[derive(Debug, Clone)]
enum Op {
    Replace(usize, usize),
    Prepend(usize),
    Append(usize),
    Forward,
    Rewind,
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1usize..6, 0usize..6).prop_map(|(len, start)| Op::Replace(len, start % len)),
        (1usize..4).prop_map(Op::Prepend),
        (1usize..4).prop_map(Op::Append),
        Just(Op::Forward),
        Just(Op::Rewind),
        Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn prop_cursor_stays_valid(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let mut queue = TrackQueue::new();
        let mut history_len = 0usize;

        for op in ops {
            match op {
                Op::Replace(len, start) => {
                    let batch: Vec<_> = (0..len).map(|i| track(&format!("t{i}"))).collect();
                    let had_current = queue.current_track().is_some();
                    queue.replace(Some(batch), start);
                    if had_current {
                        history_len += 1;
                    }
                }
                Op::Prepend(len) => {
                    let batch: Vec<_> = (0..len).map(|i| track(&format!("p{i}"))).collect();
                    queue.prepend(batch);
                }
                Op::Append(len) => {
                    let batch: Vec<_> = (0..len).map(|i| track(&format!("q{i}"))).collect();
                    queue.append(batch);
                }
                Op::Forward => {
                    if queue.forward() {
                        history_len += 1;
                    }
                }
                Op::Rewind => {
                    // Never grows the history
                    let _ = queue.rewind();
                }
                Op::Clear => queue.replace(None, 0),
            }

            // Cursor valid whenever a track is current
            if let Some(index) = queue.current_index() {
                prop_assert!(index < queue.len());
                prop_assert!(queue.current_track().is_some());
            } else {
                prop_assert!(queue.current_track().is_none());
            }
            // History grows only on replace-with-current and forward
            prop_assert_eq!(queue.history().len(), history_len);
            // At most the current track holds a handle
            let with_handles = (0..queue.len())
                .filter(|&i| queue.get(i).is_some_and(AudioTrack::has_handle))
                .count();
            prop_assert!(with_handles == 0);
        }
    }
}
