//! End-to-end controller scenarios through the public API

use std::sync::Arc;

use audiodeck::testing::{MockEngine, RecordingSink, settle, test_track};
use audiodeck::{
    NowPlayingSink, PlaybackEngine, PlaybackPhase, PlayerConfig, PlayerManager, RemoteCommand, keys,
};

fn setup() -> (PlayerManager, Arc<MockEngine>, Arc<RecordingSink>) {
    let engine = Arc::new(MockEngine::new());
    let sink = Arc::new(RecordingSink::new());
    let manager = PlayerManager::builder(Arc::clone(&engine) as Arc<dyn PlaybackEngine>)
        .now_playing_sink(Arc::clone(&sink) as Arc<dyn NowPlayingSink>)
        .build();
    (manager, engine, sink)
}

#[tokio::test]
async fn test_album_plays_through_to_the_end() {
    let (manager, engine, _sink) = setup();
    let album = vec![test_track("one"), test_track("two"), test_track("three")];
    manager.play_tracks(album, 0).await;

    for _ in 0..3 {
        engine.last_control().unwrap().trigger_ready();
        settle().await;
        assert!(manager.is_playing().await);

        engine.last_control().unwrap().trigger_ended();
        settle().await;
    }

    assert_eq!(manager.status().await.phase, PlaybackPhase::Stopped);
    assert_eq!(engine.resolve_count(), 3);
    assert_eq!(manager.history().await.len(), 2);
    assert_eq!(
        manager.current_track_info().await.unwrap().identifier,
        "https://example.com/three.mp3"
    );
}

#[tokio::test]
async fn test_now_playing_follows_the_current_track() {
    let (manager, engine, sink) = setup();
    manager
        .play_tracks(vec![test_track("one"), test_track("two")], 0)
        .await;
    engine.last_control().unwrap().trigger_ready();
    settle().await;
    assert_eq!(
        sink.last().unwrap().unwrap().text(keys::TITLE),
        Some("one.mp3")
    );

    manager.forward().await;
    engine.last_control().unwrap().trigger_ready();
    settle().await;
    assert_eq!(
        sink.last().unwrap().unwrap().text(keys::TITLE),
        Some("two.mp3")
    );

    manager.stop(true).await;
    assert_eq!(sink.last(), Some(None));
}

#[tokio::test]
async fn test_remote_control_drives_the_transport() {
    let (manager, engine, _sink) = setup();
    manager
        .play_tracks(vec![test_track("one"), test_track("two")], 0)
        .await;
    engine.last_control().unwrap().trigger_ready();
    settle().await;

    manager
        .handle_remote_command(RemoteCommand::NextTrack)
        .await;
    assert_eq!(
        manager.current_track_info().await.unwrap().identifier,
        "https://example.com/two.mp3"
    );

    engine.last_control().unwrap().trigger_ready();
    settle().await;
    manager.handle_remote_command(RemoteCommand::Pause).await;
    assert_eq!(manager.status().await.phase, PlaybackPhase::Paused);

    manager.handle_remote_command(RemoteCommand::Play).await;
    assert!(manager.is_playing().await);
}

#[tokio::test]
async fn test_double_press_previous_goes_back_a_track() {
    let (manager, engine, _sink) = setup();
    manager
        .play_tracks(vec![test_track("one"), test_track("two")], 1)
        .await;
    let control = engine.last_control().unwrap();
    control.trigger_ready();
    settle().await;
    control.set_position(30.0);

    // First press restarts the current track
    manager.handle_remote_command(RemoteCommand::PreviousTrack).await;
    assert_eq!(control.last_seek(), Some(0.0));
    assert_eq!(
        manager.current_track_info().await.unwrap().identifier,
        "https://example.com/two.mp3"
    );

    // Second press, now near the start, goes to the previous track
    manager.handle_remote_command(RemoteCommand::PreviousTrack).await;
    assert_eq!(
        manager.current_track_info().await.unwrap().identifier,
        "https://example.com/one.mp3"
    );
    assert_eq!(engine.resolve_count(), 2);
}

#[tokio::test]
async fn test_publishing_can_be_disabled() {
    let engine = Arc::new(MockEngine::new());
    let sink = Arc::new(RecordingSink::new());
    let config = PlayerConfig::builder()
        .publish_now_playing_info(false)
        .build();
    let manager = PlayerManager::builder(Arc::clone(&engine) as Arc<dyn PlaybackEngine>)
        .now_playing_sink(Arc::clone(&sink) as Arc<dyn NowPlayingSink>)
        .config(config)
        .build();

    manager.play_track(test_track("one")).await;
    engine.last_control().unwrap().trigger_ready();
    settle().await;
    manager.stop(false).await;

    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_interleaved_plays_keep_only_the_latest_queue() {
    let (manager, _engine, _sink) = setup();
    let batch = vec![
        "https://example.com/one.mp3".to_string(),
        "https://example.com/two.mp3".to_string(),
        "https://example.com/three.mp3".to_string(),
    ];
    manager.play_urls(&batch, 0).await;

    // A second play lands before the batch finishes building in the
    // background; the late prepend/append must be dropped.
    manager.play_track(test_track("late")).await;
    settle().await;

    assert_eq!(manager.queue_len().await, 1);
    assert_eq!(
        manager.current_track_info().await.unwrap().identifier,
        "https://example.com/late.mp3"
    );
}
