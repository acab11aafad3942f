//! Playback output events
//!
//! The output reports what it is actually doing through these events. Each
//! event carries the generation of the `load_source` call it belongs to so
//! the controller can drop events from a superseded load:
//! - Lifecycle (load start, metadata, ended)
//! - Command confirmations (playing, paused)
//! - Buffering start/stop
//! - Position updates (periodic)
//! - Errors

use serde::{Deserialize, Serialize};

/// Event raised by the playback output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEvent {
    /// Generation echoed from `PlaybackOutput::load_source`
    pub generation: u64,

    pub kind: OutputEventKind,
}

/// What happened at the output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputEventKind {
    /// The output started fetching the source
    LoadStart,

    /// Source opened; duration known (`None` for open-ended streams)
    MetadataLoaded { duration_seconds: Option<f64> },

    /// Buffering started (`true`) or finished (`false`)
    Buffering { active: bool },

    /// Audio is being produced
    Playing,

    /// Output stopped advancing
    Paused,

    /// Position update, typically every 250ms
    TimeUpdate { position_seconds: f64 },

    /// Load or playback failure
    Error { message: String },

    /// Reached the end of the source
    Ended,
}

impl OutputEvent {
    pub fn new(generation: u64, kind: OutputEventKind) -> Self {
        Self { generation, kind }
    }

    pub fn load_start(generation: u64) -> Self {
        Self::new(generation, OutputEventKind::LoadStart)
    }

    pub fn metadata_loaded(generation: u64, duration_seconds: f64) -> Self {
        Self::new(
            generation,
            OutputEventKind::MetadataLoaded {
                duration_seconds: Some(duration_seconds),
            },
        )
    }

    pub fn buffering(generation: u64, active: bool) -> Self {
        Self::new(generation, OutputEventKind::Buffering { active })
    }

    pub fn playing(generation: u64) -> Self {
        Self::new(generation, OutputEventKind::Playing)
    }

    pub fn paused(generation: u64) -> Self {
        Self::new(generation, OutputEventKind::Paused)
    }

    pub fn time_update(generation: u64, position_seconds: f64) -> Self {
        Self::new(generation, OutputEventKind::TimeUpdate { position_seconds })
    }

    pub fn error(generation: u64, message: impl Into<String>) -> Self {
        Self::new(
            generation,
            OutputEventKind::Error {
                message: message.into(),
            },
        )
    }

    pub fn ended(generation: u64) -> Self {
        Self::new(generation, OutputEventKind::Ended)
    }
}
