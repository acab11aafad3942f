//! Error types for media sessions

use halaqa_core::{CoreError, ItemId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error descriptor surfaced through `SessionState::last_error`
///
/// The controller never returns these from its operations; it records them
/// in the session state and moves to `Errored`.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionError {
    /// Source URL could not be resolved or the output could not open it
    #[error("Failed to load {item}: {reason}")]
    Load { item: ItemId, reason: String },

    /// The output failed while playing (stream drop, device error)
    #[error("Playback failed for {item}: {reason}")]
    Playback { item: ItemId, reason: String },

    /// The item after a finished track failed to load
    #[error("Failed to load {item} after the previous track ended: {reason}")]
    EndOfTrackLoad { item: ItemId, reason: String },
}

impl SessionError {
    /// Item the error belongs to
    pub fn item(&self) -> &ItemId {
        match self {
            Self::Load { item, .. }
            | Self::Playback { item, .. }
            | Self::EndOfTrackLoad { item, .. } => item,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Self::Load { reason, .. }
            | Self::Playback { reason, .. }
            | Self::EndOfTrackLoad { reason, .. } => reason,
        }
    }
}

/// Errors from the fallible surfaces around the controller
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Configuration could not be read
    #[error("Config error: {0}")]
    Config(String),

    /// Configuration values out of range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// The session driver has shut down
    #[error("Session driver is closed")]
    DriverClosed,

    /// The driver queue has no room for a non-blocking send
    #[error("Session command queue is full")]
    QueueFull,

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
