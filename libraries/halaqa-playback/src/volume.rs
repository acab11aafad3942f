//! Volume and playback-rate control
//!
//! Levels are kept in [0, 1]. The gain forwarded to the output follows the
//! configured curve: linear, or a dB mapping where 0% = -60 dB (near
//! silence) and 100% = 0 dB (unity gain).

use crate::types::{VolumeCurve, MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE};

/// Volume controller
#[derive(Debug, Clone)]
pub struct Volume {
    /// Volume level in [0, 1]
    level: f64,

    /// Mute state (preserves volume level)
    muted: bool,

    curve: VolumeCurve,
}

impl Volume {
    /// Create a volume controller; NaN levels fall back to full volume
    pub fn new(level: f64, curve: VolumeCurve) -> Self {
        let level = if level.is_nan() {
            1.0
        } else {
            level.clamp(0.0, 1.0)
        };

        Self {
            level,
            muted: false,
            curve,
        }
    }

    /// Set the level, clamped to [0, 1]
    ///
    /// Returns `false` and keeps the previous level for NaN input.
    pub fn set_level(&mut self, level: f64) -> bool {
        if level.is_nan() {
            return false;
        }
        self.level = level.clamp(0.0, 1.0);
        true
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Gain to forward to the output
    ///
    /// Returns 0.0 if muted, otherwise the level mapped through the curve
    pub fn gain(&self) -> f64 {
        if self.muted || self.level == 0.0 {
            return 0.0;
        }

        match self.curve {
            VolumeCurve::Linear => self.level,
            VolumeCurve::Logarithmic => {
                // Map 0-100% to -60 dB..0 dB, then gain = 10^(dB/20)
                let db = (self.level - 1.0) * 60.0;
                10.0_f64.powf(db / 20.0)
            }
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(1.0, VolumeCurve::Linear)
    }
}

/// Clamp a playback rate into the supported range; `None` for NaN
pub fn clamp_playback_rate(rate: f64) -> Option<f64> {
    if rate.is_nan() {
        None
    } else {
        Some(rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::new(0.8, VolumeCurve::Linear);
        assert_eq!(vol.level(), 0.8);
        assert!(!vol.is_muted());
    }

    #[test]
    fn set_volume_level_clamps() {
        let mut vol = Volume::default();

        assert!(vol.set_level(1.5));
        assert_eq!(vol.level(), 1.0);

        assert!(vol.set_level(-0.2));
        assert_eq!(vol.level(), 0.0);
    }

    #[test]
    fn nan_level_is_rejected() {
        let mut vol = Volume::new(0.4, VolumeCurve::Linear);
        assert!(!vol.set_level(f64::NAN));
        assert_eq!(vol.level(), 0.4);

        assert_eq!(Volume::new(f64::NAN, VolumeCurve::Linear).level(), 1.0);
    }

    #[test]
    fn mute_preserves_level() {
        let mut vol = Volume::new(0.8, VolumeCurve::Linear);
        vol.set_muted(true);
        assert_eq!(vol.gain(), 0.0);
        assert_eq!(vol.level(), 0.8);

        vol.set_muted(false);
        assert_eq!(vol.gain(), 0.8);
    }

    #[test]
    fn logarithmic_gain() {
        let vol = Volume::new(1.0, VolumeCurve::Logarithmic);
        assert!((vol.gain() - 1.0).abs() < 0.001);

        // 50% is -30 dB
        let vol = Volume::new(0.5, VolumeCurve::Logarithmic);
        assert!((vol.gain() - 0.0316).abs() < 0.001);

        // 80% is -12 dB
        let vol = Volume::new(0.8, VolumeCurve::Logarithmic);
        assert!((vol.gain() - 0.251).abs() < 0.01);

        let vol = Volume::new(0.0, VolumeCurve::Logarithmic);
        assert_eq!(vol.gain(), 0.0);
    }

    #[test]
    fn playback_rate_clamps() {
        assert_eq!(clamp_playback_rate(0.1), Some(0.25));
        assert_eq!(clamp_playback_rate(1.5), Some(1.5));
        assert_eq!(clamp_playback_rate(10.0), Some(4.0));
        assert_eq!(clamp_playback_rate(f64::NAN), None);
    }
}
