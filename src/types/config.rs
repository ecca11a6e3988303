//! Controller configuration

use std::time::Duration;

/// Configuration for [`crate::PlayerManager`](crate::manager::PlayerManager)
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Interval of the playback-time refresh while playing
    /// (default: 100ms)
    pub refresh_interval: Duration,

    /// Publish now-playing info to the configured sink (default: true)
    pub publish_now_playing_info: bool,

    /// React to remote-control commands (default: true)
    pub consume_remote_control_events: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(100),
            publish_now_playing_info: true,
            consume_remote_control_events: true,
        }
    }
}

impl PlayerConfig {
    /// Create a new config builder
    #[must_use]
    pub fn builder() -> PlayerConfigBuilder {
        PlayerConfigBuilder::default()
    }
}

/// Builder for `PlayerConfig`
#[derive(Debug, Clone, Default)]
pub struct PlayerConfigBuilder {
    config: PlayerConfig,
}

impl PlayerConfigBuilder {
    /// Set the playback-time refresh interval
    #[must_use]
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.config.refresh_interval = interval;
        self
    }

    /// Enable or disable now-playing publishing
    #[must_use]
    pub fn publish_now_playing_info(mut self, enable: bool) -> Self {
        self.config.publish_now_playing_info = enable;
        self
    }

    /// Enable or disable remote-control command handling
    #[must_use]
    pub fn consume_remote_control_events(mut self, enable: bool) -> Self {
        self.config.consume_remote_control_events = enable;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> PlayerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlayerConfig::default();
        assert_eq!(config.refresh_interval, Duration::from_millis(100));
        assert!(config.publish_now_playing_info);
        assert!(config.consume_remote_control_events);
    }

    #[test]
    fn test_builder() {
        let config = PlayerConfig::builder()
            .refresh_interval(Duration::from_secs(1))
            .publish_now_playing_info(false)
            .build();
        assert_eq!(config.refresh_interval, Duration::from_secs(1));
        assert!(!config.publish_now_playing_info);
        assert!(config.consume_remote_control_events);
    }
}
