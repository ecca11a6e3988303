use thiserror::Error;

/// Errors that can occur at the platform-engine seam
///
/// Transport and queue operations never surface errors to the caller;
/// boundary conditions are reported through predicates and `false` returns.
/// These variants exist for `PlaybackEngine` implementations and the track
/// factories.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// A track source could not be turned into a playable handle
    #[error("unresolvable track source {identifier}: {reason}")]
    UnresolvableSource {
        /// Identifier of the offending source
        identifier: String,
        /// Description of the failure
        reason: String,
    },

    /// A URL string is not a usable track source
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The rejected URL string
        url: String,
    },

    /// A persistent library identifier has no matching media item
    #[error("media item not found for persistent id {persistent_id}")]
    MediaItemNotFound {
        /// The unmatched persistent identifier
        persistent_id: u64,
    },

    /// The media item exists but is not playable
    #[error("media item {identifier} is not playable")]
    NotPlayable {
        /// Identifier of the item
        identifier: String,
    },

    /// Engine-internal failure while preparing playback
    #[error("engine error: {message}")]
    EngineError {
        /// Description of the error
        message: String,
        /// The underlying source of the error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PlayerError {
    /// Check if this error is caused by the track source itself
    ///
    /// Source errors are skipped during batch construction rather than
    /// failing the whole batch.
    #[must_use]
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::UnresolvableSource { .. }
                | Self::InvalidUrl { .. }
                | Self::MediaItemNotFound { .. }
                | Self::NotPlayable { .. }
        )
    }
}

/// Result type alias for engine-seam operations
pub type Result<T> = std::result::Result<T, PlayerError>;
