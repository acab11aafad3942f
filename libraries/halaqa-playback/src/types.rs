//! Core types for media sessions

use crate::error::SessionError;
use halaqa_core::ItemId;
use serde::{Deserialize, Serialize};

/// Lowest accepted playback rate
pub const MIN_PLAYBACK_RATE: f64 = 0.25;

/// Highest accepted playback rate
pub const MAX_PLAYBACK_RATE: f64 = 4.0;

/// Slack allowed between a reported position and the duration
///
/// Output devices round time updates, so a position slightly past the
/// duration is expected near the end of a track.
pub const POSITION_EPSILON: f64 = 0.05;

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Nothing loaded
    #[default]
    Idle,

    /// Source being resolved or opened
    Loading,

    /// Loaded, not started
    Ready,

    /// Output is producing audio
    Playing,

    /// Loaded, not advancing
    Paused,

    /// Waiting on data mid-playback
    Buffering,

    /// Reached the end of the current item
    Ended,

    /// Load or playback failed, see `last_error`
    Errored,
}

impl SessionStatus {
    /// Whether the output holds an opened source
    pub fn is_loaded(self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Playing | Self::Paused | Self::Buffering | Self::Ended
        )
    }
}

/// Snapshot of a media session
///
/// Handed to subscribers on every change. Readers never mutate it; the
/// controller is the only writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Position in the catalog, `None` when nothing is loaded
    pub current_index: Option<usize>,

    /// Id of the item at `current_index`
    pub current_item: Option<ItemId>,

    pub status: SessionStatus,

    /// Playback position in seconds
    pub position_seconds: f64,

    /// Duration reported by the output, `None` until known
    pub duration_seconds: Option<f64>,

    /// Volume level in [0, 1]
    pub volume: f64,

    pub muted: bool,

    /// Playback speed in [0.25, 4.0]
    pub playback_rate: f64,

    /// Restart the same item when it ends
    pub repeat_one: bool,

    /// Pick the next item at random
    pub shuffle: bool,

    /// Last load or playback failure, cleared by the next successful load
    pub last_error: Option<SessionError>,

    /// Current load generation
    pub generation: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_index: None,
            current_item: None,
            status: SessionStatus::Idle,
            position_seconds: 0.0,
            duration_seconds: None,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
            repeat_one: false,
            shuffle: false,
            last_error: None,
            generation: 0,
        }
    }
}

impl SessionState {
    /// Progress through the current item in [0, 1], if the duration is known
    pub fn progress(&self) -> Option<f64> {
        match self.duration_seconds {
            Some(duration) if duration > 0.0 => {
                Some((self.position_seconds / duration).clamp(0.0, 1.0))
            }
            _ => None,
        }
    }
}

/// Immediate answer to a `play()` request
///
/// `Requested` only means the command reached the output; the session moves
/// to `Playing` when the output confirms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Play command issued to the output
    Requested,

    /// Source still loading; playback starts once it is ready
    Deferred,

    /// Nothing to do (already playing, nothing loaded)
    Ignored,

    /// The session is in error; retry or skip first
    Rejected(SessionError),
}

/// How volume levels map to output gain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeCurve {
    /// Gain equals the level
    #[default]
    Linear,

    /// Level mapped onto -60 dB..0 dB
    Logarithmic,
}
