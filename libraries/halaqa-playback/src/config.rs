/// Session configuration
use crate::error::{PlaybackError, Result};
use crate::types::{VolumeCurve, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for overrides (`HALAQA_VOLUME=0.5`)
pub const ENV_PREFIX: &str = "HALAQA";

/// Upper bound for `max_end_of_track_retries`
pub const MAX_END_OF_TRACK_RETRIES: u32 = 8;

/// Initial settings for a media session
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Initial volume in [0, 1] (default: 1.0)
    #[serde(default = "default_volume")]
    pub volume: f64,

    /// Start muted (default: false)
    #[serde(default)]
    pub muted: bool,

    /// Initial playback rate (default: 1.0)
    #[serde(default = "default_playback_rate")]
    pub playback_rate: f64,

    /// Initial repeat-one flag (default: false)
    #[serde(default)]
    pub repeat_one: bool,

    /// Initial shuffle flag (default: false)
    #[serde(default)]
    pub shuffle: bool,

    /// Volume-to-gain mapping (default: linear)
    #[serde(default)]
    pub volume_curve: VolumeCurve,

    /// Extra advances tried when the item after a finished track fails to
    /// load (default: 1, at most [`MAX_END_OF_TRACK_RETRIES`])
    #[serde(default = "default_max_end_of_track_retries")]
    pub max_end_of_track_retries: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
            muted: false,
            playback_rate: default_playback_rate(),
            repeat_one: false,
            shuffle: false,
            volume_curve: VolumeCurve::default(),
            max_end_of_track_retries: default_max_end_of_track_retries(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from an optional TOML file and the environment
    ///
    /// Environment variables prefixed with `HALAQA_` override the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                settings = settings.add_source(config::File::from(path));
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX).try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(PlaybackError::InvalidConfig(format!(
                "volume must be within 0..=1, got {}",
                self.volume
            )));
        }

        if !(MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE).contains(&self.playback_rate) {
            return Err(PlaybackError::InvalidConfig(format!(
                "playback_rate must be within {}..={}, got {}",
                MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE, self.playback_rate
            )));
        }

        if self.max_end_of_track_retries > MAX_END_OF_TRACK_RETRIES {
            return Err(PlaybackError::InvalidConfig(format!(
                "max_end_of_track_retries must be at most {}, got {}",
                MAX_END_OF_TRACK_RETRIES, self.max_end_of_track_retries
            )));
        }

        Ok(())
    }
}

// Default values
fn default_volume() -> f64 {
    1.0
}

fn default_playback_rate() -> f64 {
    1.0
}

fn default_max_end_of_track_retries() -> u32 {
    1
}
