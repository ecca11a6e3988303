//! # audiodeck
//!
//! A queue-driven audio playback controller with pluggable backends.
//!
//! ## Features
//!
//! - Track queue with forward/rewind navigation and play history
//! - Generation-checked asynchronous queue completion
//! - URL and media-library track sources, with batch factories that skip
//!   bad entries
//! - Now-playing metadata publishing for lock-screen style surfaces
//! - Remote-control command dispatch
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use audiodeck::testing::MockEngine;
//! use audiodeck::{PlaybackEngine, PlayerManager};
//!
//! # async fn example() {
//! let engine: Arc<dyn PlaybackEngine> = Arc::new(MockEngine::new());
//! let player = PlayerManager::new(engine);
//!
//! let urls = vec![
//!     "https://example.com/one.mp3".to_string(),
//!     "https://example.com/two.mp3".to_string(),
//! ];
//! player.play_urls(&urls, 0).await;
//!
//! if player.can_forward().await {
//!     player.forward().await;
//! }
//! # }
//! ```
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Controller**: `PlayerManager` - Transport, sessions, observation
//! - **Queue**: `TrackQueue` - Ordered tracks, cursor, history
//! - **Seams**: `engine` traits - Everything platform-specific

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
/// Platform collaborator traits
pub mod engine;
/// Error types
pub mod error;
/// Playback controller
pub mod manager;
/// Track queue
pub mod queue;
/// Core types
pub mod types;

/// Testing utilities
pub mod testing;

// Re-exports
pub use engine::{
    MediaItem, MediaLibrary, NowPlayingSink, PlayableHandle, PlaybackEngine, RemoteCommand,
};
pub use error::PlayerError;
pub use manager::{
    CallbackToken, PlayStateCallback, PlayerManager, PlayerManagerBuilder, PlaybackTimeCallback,
};
pub use queue::TrackQueue;
pub use types::{
    AudioTrack, MetadataValue, NowPlayingInfo, PlaybackPhase, PlayerConfig, PlayerConfigBuilder,
    PlayerStatus, TrackId, TrackInfo, TrackMetadata, TrackSource, keys,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
///
/// Convenient re-exports
pub mod prelude {
    pub use crate::{
        AudioTrack, CallbackToken, MediaItem, NowPlayingInfo, PlaybackEngine, PlaybackPhase,
        PlayerConfig, PlayerError, PlayerManager, PlayerStatus, RemoteCommand, TrackQueue,
        TrackSource,
    };
}
