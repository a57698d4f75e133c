//! Upward Compression (OTT)
//!
//! Lifts quiet material toward the threshold with a quartic soft knee:
//!
//! ```text
//! gain = 1 + ((t - |x|) / t)^4 * (ratio - 1)    for |x| < t
//! gain = 1                                      otherwise
//! ```
//!
//! The gain multiplies the sample, is exactly 1 at the threshold and
//! approaches `ratio` as the sample approaches silence. Stateless; only
//! runs in OTT speed mode, ahead of the downward compressor.

use crate::dynamics::db_to_linear;

/// Threshold and ratio derived from one intensity value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpwardSettings {
    pub threshold_db: f32,
    pub ratio: f32,
}

impl UpwardSettings {
    /// Linear map: threshold -60..-30 dB, ratio 1.5..3.5
    pub fn from_intensity(intensity: f32) -> Self {
        let intensity = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };
        Self {
            threshold_db: -60.0 + 30.0 * intensity,
            ratio: 1.5 + 2.0 * intensity,
        }
    }
}

/// Apply the upward gain curve to one sample
#[inline]
pub fn upward_boost(sample: f32, threshold_linear: f32, ratio: f32) -> f32 {
    let level = sample.abs();
    if threshold_linear <= 0.0 || level >= threshold_linear {
        return sample;
    }
    let depth = (threshold_linear - level) / threshold_linear;
    let depth2 = depth * depth;
    sample * (1.0 + depth2 * depth2 * (ratio - 1.0))
}

/// Per-band upward stage holding the linear threshold for the current block
#[derive(Debug, Clone, Copy)]
pub struct UpwardExpander {
    settings: UpwardSettings,
    threshold_linear: f32,
}

impl Default for UpwardExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl UpwardExpander {
    pub fn new() -> Self {
        let settings = UpwardSettings::from_intensity(0.0);
        Self {
            settings,
            threshold_linear: db_to_linear(settings.threshold_db),
        }
    }

    /// Recompute the threshold; call once per block
    pub fn configure(&mut self, intensity: f32) {
        let settings = UpwardSettings::from_intensity(intensity);
        if settings != self.settings {
            self.threshold_linear = db_to_linear(settings.threshold_db);
            self.settings = settings;
        }
    }

    #[inline]
    pub fn boost(&self, sample: f32) -> f32 {
        upward_boost(sample, self.threshold_linear, self.settings.ratio)
    }

    pub fn settings(&self) -> UpwardSettings {
        self.settings
    }

    pub fn threshold_linear(&self) -> f32 {
        self.threshold_linear
    }
}
