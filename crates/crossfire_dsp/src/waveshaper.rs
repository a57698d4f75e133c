//! Waveshaping Distortion
//!
//! Three tanh-based saturation characters driven by a single 0-1 intensity.
//!
//! # Algorithm
//!
//! - `drive = 1 + 6 * intensity`
//! - **Warm**: `tanh(drive * x)` plus a small cubic term for odd harmonics,
//!   scaled down as drive rises so loudness stays roughly level.
//! - **Crush**: Warm fed into a second tanh, with drive pushed up by a slow
//!   envelope follower on `|x|`, so loud passages saturate harder.
//! - **Dont**: Crush at squared drive, a third tanh at drive², then a steep
//!   volume compensation so the extreme setting stays in range.
//!
//! Every character is bounded for any input: tanh caps at 1 and every
//! scale factor is at most 1.

/// Distortion character, selected from one continuous 0-1 control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Character {
    Warm,
    Crush,
    Dont,
}

impl Character {
    /// Map the continuous control onto three characters
    ///
    /// `< 0.4` Warm, `< 0.6` Crush, otherwise Dont. Hosts automate the
    /// character as one float, so the thresholds are part of the contract.
    pub fn from_control(value: f32) -> Self {
        match three_way(value) {
            0 => Self::Warm,
            1 => Self::Crush,
            _ => Self::Dont,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Warm => "Warm",
            Self::Crush => "Crush",
            Self::Dont => "Dont",
        }
    }
}

/// Shared 3-way split for continuous mode controls (`< 0.4`, `< 0.6`, else)
pub fn three_way(value: f32) -> usize {
    if value < 0.4 {
        0
    } else if value < 0.6 {
        1
    } else {
        2
    }
}

/// Map a 0-1 intensity onto the internal drive range [1, 7]
///
/// NaN maps to the minimum drive.
pub fn drive_from_intensity(intensity: f32) -> f32 {
    1.0 + 6.0 * clamp_unit(intensity)
}

#[inline]
fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Empirical constants of the saturation curves
///
/// The shapes (monotonic loudness compensation, bounded output) are fixed;
/// the numbers are tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeTuning {
    /// Cubic term added after the first tanh
    pub harmonic: f32,
    /// Warm loudness compensation: `1 / (1 + slope * (drive - 1))`
    pub warm_compensation: f32,
    /// Crush/Dont loudness compensation slope
    pub crush_compensation: f32,
    /// One-pole coefficient of the envelope follower
    pub envelope_pole: f32,
    /// How far the envelope raises drive: `drive * (1 + depth * env)`
    pub envelope_depth: f32,
    /// Dont output gain at drive 1 and at drive 7
    pub dont_compensation: (f32, f32),
    /// Exponent applied to the Dont output gain
    pub dont_exponent: f32,
    /// Intensity over which the shaped signal is faded in from bypass
    pub engage_range: f32,
}

impl Default for ShapeTuning {
    fn default() -> Self {
        Self {
            harmonic: 0.15,
            warm_compensation: 0.295,
            crush_compensation: 0.3,
            envelope_pole: 0.001,
            envelope_depth: 0.5,
            dont_compensation: (0.5, 0.15),
            dont_exponent: 1.1,
            engage_range: 0.05,
        }
    }
}

/// Per-band waveshaper
///
/// Owns its envelope follower; one instance per channel per band. The
/// envelope keeps tracking across character switches and is only cleared
/// by `reset()`.
#[derive(Debug, Clone)]
pub struct Waveshaper {
    envelope: f32,
    tuning: ShapeTuning,
}

impl Default for Waveshaper {
    fn default() -> Self {
        Self::new()
    }
}

impl Waveshaper {
    pub fn new() -> Self {
        Self::with_tuning(ShapeTuning::default())
    }

    pub fn with_tuning(tuning: ShapeTuning) -> Self {
        Self {
            envelope: 0.0,
            tuning,
        }
    }

    /// Shape one sample
    ///
    /// Intensity 0 returns `x` untouched. Between 0 and `engage_range`
    /// the shaped signal is cross-faded in.
    ///
    /// # Real-time Safety
    /// No allocations, O(1).
    #[inline]
    pub fn shape(&mut self, x: f32, drive_intensity: f32, character: Character) -> f32 {
        let t = &self.tuning;
        self.envelope = (1.0 - t.envelope_pole) * self.envelope + t.envelope_pole * x.abs();

        let intensity = clamp_unit(drive_intensity);
        if intensity <= 0.0 {
            return x;
        }

        let drive = drive_from_intensity(intensity);
        let shaped = match character {
            Character::Warm => self.warm(x, drive),
            Character::Crush => self.crush(x, drive),
            Character::Dont => self.dont(x, drive),
        };

        let mix = if t.engage_range > 0.0 {
            (intensity / t.engage_range).min(1.0)
        } else {
            1.0
        };
        x + (shaped - x) * mix
    }

    #[inline]
    fn warm(&self, x: f32, drive: f32) -> f32 {
        let t = &self.tuning;
        let soft = (drive * x).tanh();
        let rich = soft + t.harmonic * soft * soft * soft;
        let scale = 1.0 / (1.0 + t.warm_compensation * (drive - 1.0));
        scale * rich
    }

    #[inline]
    fn crush(&self, x: f32, drive: f32) -> f32 {
        let t = &self.tuning;
        let dynamic_drive = drive * (1.0 + t.envelope_depth * self.envelope);
        let scale = 1.0 / (1.0 + t.crush_compensation * (drive - 1.0));
        let warm = self.warm(x, dynamic_drive);
        scale * (dynamic_drive * warm).tanh()
    }

    #[inline]
    fn dont(&self, x: f32, drive: f32) -> f32 {
        let t = &self.tuning;
        let dynamic_drive = drive * drive * (1.0 + t.envelope_depth * self.envelope);
        let scale = 1.0 / (1.0 + t.crush_compensation * (drive - 1.0));

        let warm = self.warm(x, dynamic_drive);
        let saturated = scale * (dynamic_drive * warm).tanh();
        let saturated = (dynamic_drive * dynamic_drive * saturated).tanh();

        // drive 1..7 onto the compensation span, then bend it down harder
        let (at_min, at_max) = t.dont_compensation;
        let position = (drive - 1.0) / 6.0;
        let compensation = (at_min + (at_max - at_min) * position).max(0.0);
        saturated * compensation.powf(t.dont_exponent)
    }

    /// Current envelope follower value
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    pub fn tuning(&self) -> &ShapeTuning {
        &self.tuning
    }

    /// Clear the envelope (stream restart)
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}
