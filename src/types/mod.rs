//! Core types

mod config;
mod now_playing;
mod state;
mod track;

pub use config::{PlayerConfig, PlayerConfigBuilder};
pub use now_playing::{MetadataValue, NowPlayingInfo, TrackMetadata, keys};
pub use state::{PlaybackPhase, PlayerStatus};
pub use track::{AudioTrack, TrackId, TrackInfo, TrackSource};
