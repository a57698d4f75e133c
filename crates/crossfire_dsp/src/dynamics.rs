//! Downward Compression
//!
//! Per-band peak compressor with makeup gain, driven by one perceptual
//! intensity control:
//!
//! - `threshold_db = intensity * -30`
//! - `ratio = 1 + intensity * 35`
//! - `makeup_db` rises monotonically with intensity ([`MakeupCurve`])
//!
//! Attack and release come from the speed mode (Glue / Tame / OTT).
//! Settings are recomputed once per block; the makeup gain ramps linearly
//! across one block so a change is complete by the end of that block.

use crate::smoothing::SmoothedValue;
use crate::waveshaper::three_way;

/// Makeup ramp length until the host reports its block size
const DEFAULT_BLOCK_FRAMES: usize = 512;

/// Compressor timing mode, selected from one continuous 0-1 control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedMode {
    /// Fast attack, short release
    Glue,
    /// Slow, musical attack and release
    Tame,
    /// Fast attack with upward compression enabled
    Ott,
}

impl SpeedMode {
    /// `< 0.4` Glue, `< 0.6` Tame, otherwise OTT
    pub fn from_control(value: f32) -> Self {
        match three_way(value) {
            0 => Self::Glue,
            1 => Self::Tame,
            _ => Self::Ott,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Glue => "Glue",
            Self::Tame => "Tame",
            Self::Ott => "OTT",
        }
    }

    /// Attack time in ms; Glue and OTT use one sample at `sample_rate`
    pub fn attack_ms(self, sample_rate: f32) -> f32 {
        let fastest = 1000.0 / sample_rate;
        match self {
            Self::Glue | Self::Ott => fastest,
            Self::Tame => 100.0,
        }
    }

    pub fn release_ms(self) -> f32 {
        match self {
            Self::Glue => 50.0,
            Self::Tame => 200.0,
            Self::Ott => 60.0,
        }
    }

    /// Whether the upward stage runs in this mode
    pub fn upward_enabled(self) -> bool {
        self == Self::Ott
    }
}

/// Makeup gain curve: `makeup_db = (1 + scale * i)^exponent - 1`
///
/// Zero at intensity 0, monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MakeupCurve {
    pub scale: f32,
    pub exponent: f32,
}

impl Default for MakeupCurve {
    fn default() -> Self {
        Self {
            scale: 2.5,
            exponent: 2.5,
        }
    }
}

impl MakeupCurve {
    pub fn gain_db(&self, intensity: f32) -> f32 {
        (1.0 + self.scale * intensity).powf(self.exponent) - 1.0
    }
}

/// Threshold, ratio and makeup derived from one intensity value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorSettings {
    pub threshold_db: f32,
    pub ratio: f32,
    pub makeup_gain_db: f32,
}

impl CompressorSettings {
    /// Derive settings with the default makeup curve
    pub fn from_intensity(intensity: f32) -> Self {
        Self::from_intensity_with(intensity, &MakeupCurve::default())
    }

    /// Intensity is clamped to [0, 1] before any curve is evaluated
    pub fn from_intensity_with(intensity: f32, curve: &MakeupCurve) -> Self {
        let intensity = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };

        Self {
            threshold_db: intensity * -30.0,
            ratio: 1.0 + intensity * 35.0,
            makeup_gain_db: curve.gain_db(intensity),
        }
    }
}

#[inline]
pub(crate) fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

#[inline]
fn linear_to_db(linear: f32) -> f32 {
    20.0 * linear.max(1e-10).log10()
}

/// One-pole coefficient for a time constant in ms; zero below 1 µs
fn time_coefficient(time_ms: f32, sample_rate: f32) -> f32 {
    if time_ms < 1.0e-3 {
        0.0
    } else {
        (-2.0 * std::f32::consts::PI * 1000.0 / (sample_rate * time_ms)).exp()
    }
}

/// Peak envelope follower with separate attack and release
#[derive(Debug, Clone, Copy)]
struct Ballistics {
    attack: f32,
    release: f32,
    level: f32,
}

impl Ballistics {
    fn new() -> Self {
        Self {
            attack: 0.0,
            release: 0.0,
            level: 0.0,
        }
    }

    fn set_times(&mut self, attack_ms: f32, release_ms: f32, sample_rate: f32) {
        self.attack = time_coefficient(attack_ms, sample_rate);
        self.release = time_coefficient(release_ms, sample_rate);
    }

    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let input = x.abs();
        let coeff = if input > self.level {
            self.attack
        } else {
            self.release
        };
        self.level = input + coeff * (self.level - input);
        self.level
    }
}

/// Downward compressor plus makeup gain for one band of one channel
#[derive(Debug, Clone)]
pub struct DynamicsProcessor {
    sample_rate: f32,
    envelope: Ballistics,
    settings: CompressorSettings,
    speed: SpeedMode,
    curve: MakeupCurve,
    threshold_linear: f32,
    threshold_inverse: f32,
    ratio_inverse: f32,
    makeup: SmoothedValue,
    gain_reduction_db: f32,
}

impl DynamicsProcessor {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_curve(sample_rate, MakeupCurve::default())
    }

    pub fn with_curve(sample_rate: f32, curve: MakeupCurve) -> Self {
        let mut processor = Self {
            sample_rate,
            envelope: Ballistics::new(),
            settings: CompressorSettings::from_intensity_with(0.0, &curve),
            speed: SpeedMode::Glue,
            curve,
            threshold_linear: 1.0,
            threshold_inverse: 1.0,
            ratio_inverse: 1.0,
            makeup: SmoothedValue::new(1.0, DEFAULT_BLOCK_FRAMES),
            gain_reduction_db: 0.0,
        };
        processor.set_speed(SpeedMode::Glue);
        processor.makeup.snap();
        processor
    }

    fn set_speed(&mut self, speed: SpeedMode) {
        self.envelope
            .set_times(speed.attack_ms(self.sample_rate), speed.release_ms(), self.sample_rate);
        self.speed = speed;
    }

    /// Number of frames in the coming blocks; the makeup ramp spans one block
    pub fn set_block_size(&mut self, frames: usize) {
        self.makeup.set_ramp_samples(frames);
    }

    /// Apply a new intensity and speed mode
    ///
    /// Called once per block before any sample is processed. Allocation-free.
    pub fn configure(&mut self, intensity: f32, speed: SpeedMode) {
        let settings = CompressorSettings::from_intensity_with(intensity, &self.curve);
        self.apply_settings(settings, speed);
    }

    /// Apply explicit settings (e.g. a custom curve computed elsewhere)
    pub fn apply_settings(&mut self, settings: CompressorSettings, speed: SpeedMode) {
        self.threshold_linear = db_to_linear(settings.threshold_db);
        self.threshold_inverse = 1.0 / self.threshold_linear;
        self.ratio_inverse = 1.0 / settings.ratio.max(1.0);
        self.makeup.set_target(db_to_linear(settings.makeup_gain_db));

        if speed != self.speed {
            self.set_speed(speed);
        }
        self.settings = settings;
    }

    /// Compress one sample and apply makeup gain
    ///
    /// # Real-time Safety
    /// No allocations, O(1).
    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        let level = self.envelope.process(x);
        let gain = if level < self.threshold_linear {
            1.0
        } else {
            (level * self.threshold_inverse).powf(self.ratio_inverse - 1.0)
        };
        self.gain_reduction_db = -linear_to_db(gain);
        x * gain * self.makeup.next()
    }

    pub fn settings(&self) -> CompressorSettings {
        self.settings
    }

    pub fn speed(&self) -> SpeedMode {
        self.speed
    }

    /// Gain reduction applied to the most recent sample, in dB (>= 0)
    pub fn gain_reduction_db(&self) -> f32 {
        self.gain_reduction_db
    }

    /// Clear the detector and land the makeup ramp on its target
    pub fn reset(&mut self) {
        self.envelope.level = 0.0;
        self.gain_reduction_db = 0.0;
        self.makeup.snap();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const SAMPLE_RATE: f32 = 44100.0;

    /// Average gain reduction over the last 0.1 s of a 1 s sine
    fn steady_reduction(intensity: f32, speed: SpeedMode, amplitude: f32) -> f32 {
        let mut comp = DynamicsProcessor::new(SAMPLE_RATE);
        comp.configure(intensity, speed);
        comp.reset();
        let total = SAMPLE_RATE as usize;
        let tail = total - 4410;
        let mut sum = 0.0;
        for i in 0..total {
            let x = amplitude * (2.0 * PI * 220.0 * i as f32 / SAMPLE_RATE).sin();
            comp.process(x);
            if i >= tail {
                sum += comp.gain_reduction_db();
            }
        }
        sum / 4410.0
    }

    #[test]
    fn test_speed_mode_mapping() {
        let modes: Vec<usize> = [0.39, 0.4, 0.59, 0.6, 0.99]
            .iter()
            .map(|&v| SpeedMode::from_control(v).index())
            .collect();
        assert_eq!(modes, vec![0, 1, 1, 2, 2]);
    }

    #[test]
    fn test_speed_mode_timing() {
        let fastest = 1000.0 / SAMPLE_RATE;
        assert_eq!(SpeedMode::Glue.attack_ms(SAMPLE_RATE), fastest);
        assert_eq!(SpeedMode::Tame.attack_ms(SAMPLE_RATE), 100.0);
        assert_eq!(SpeedMode::Ott.attack_ms(SAMPLE_RATE), fastest);
        assert_eq!(SpeedMode::Glue.release_ms(), 50.0);
        assert_eq!(SpeedMode::Tame.release_ms(), 200.0);
        assert_eq!(SpeedMode::Ott.release_ms(), 60.0);
        assert!(SpeedMode::Ott.upward_enabled());
        assert!(!SpeedMode::Tame.upward_enabled());
    }

    #[test]
    fn test_settings_endpoints() {
        let zero = CompressorSettings::from_intensity(0.0);
        assert_eq!(zero.threshold_db, 0.0);
        assert_eq!(zero.ratio, 1.0);
        assert_eq!(zero.makeup_gain_db, 0.0);

        let full = CompressorSettings::from_intensity(1.0);
        assert_eq!(full.threshold_db, -30.0);
        assert_eq!(full.ratio, 36.0);
        assert!(full.makeup_gain_db > 20.0);
    }

    #[test]
    fn test_settings_monotonic_in_intensity() {
        let mut previous = CompressorSettings::from_intensity(0.0);
        for step in 1..=20 {
            let current = CompressorSettings::from_intensity(step as f32 / 20.0);
            assert!(current.threshold_db < previous.threshold_db);
            assert!(current.ratio > previous.ratio);
            assert!(current.makeup_gain_db > previous.makeup_gain_db);
            previous = current;
        }
    }

    #[test]
    fn test_intensity_clamped() {
        assert_eq!(
            CompressorSettings::from_intensity(2.0),
            CompressorSettings::from_intensity(1.0)
        );
        assert_eq!(
            CompressorSettings::from_intensity(-0.5),
            CompressorSettings::from_intensity(0.0)
        );
        assert_eq!(
            CompressorSettings::from_intensity(f32::NAN),
            CompressorSettings::from_intensity(0.0)
        );
    }

    #[test]
    fn test_zero_intensity_is_transparent() {
        let mut comp = DynamicsProcessor::new(SAMPLE_RATE);
        comp.configure(0.0, SpeedMode::Tame);
        for i in 0..2000 {
            let x = 1.5 * (i as f32 * 0.05).sin();
            assert_eq!(comp.process(x), x);
        }
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }

    #[test]
    fn test_more_intensity_more_reduction() {
        let gentle = steady_reduction(0.3, SpeedMode::Glue, 0.8);
        let heavy = steady_reduction(0.8, SpeedMode::Glue, 0.8);
        assert!(gentle > 0.0, "No reduction at 0.3: {}", gentle);
        assert!(heavy > gentle, "heavy {} <= gentle {}", heavy, gentle);
    }

    #[test]
    fn test_below_threshold_untouched() {
        let reduction = steady_reduction(0.5, SpeedMode::Glue, 0.05);
        assert_eq!(reduction, 0.0);
    }

    #[test]
    fn test_tame_attacks_slower_than_glue() {
        let mut glue = DynamicsProcessor::new(SAMPLE_RATE);
        let mut tame = DynamicsProcessor::new(SAMPLE_RATE);
        glue.configure(1.0, SpeedMode::Glue);
        tame.configure(1.0, SpeedMode::Tame);
        glue.reset();
        tame.reset();
        // 5 ms burst of full-scale signal
        for _ in 0..220 {
            glue.process(1.0);
            tame.process(1.0);
        }
        assert!(glue.gain_reduction_db() > tame.gain_reduction_db());
    }

    #[test]
    fn test_makeup_ramps_then_settles() {
        let mut comp = DynamicsProcessor::new(SAMPLE_RATE);
        comp.configure(0.5, SpeedMode::Glue);
        let target = db_to_linear(comp.settings().makeup_gain_db);

        // Quiet input: no reduction, output is input times makeup
        let first = comp.process(0.001) / 0.001;
        assert!(first < target, "makeup jumped straight to target");
        for _ in 1..DEFAULT_BLOCK_FRAMES {
            comp.process(0.001);
        }
        let settled = comp.process(0.001) / 0.001;
        assert!((settled - target).abs() / target < 1e-3);
    }

    #[test]
    fn test_makeup_settles_within_one_block() {
        let block = 512;
        let mut comp = DynamicsProcessor::new(SAMPLE_RATE);
        comp.set_block_size(block);
        comp.configure(0.0, SpeedMode::Glue);
        comp.reset();
        comp.configure(1.0, SpeedMode::Glue);
        let target = db_to_linear(comp.settings().makeup_gain_db);

        let mut gain = 0.0;
        for _ in 0..block {
            gain = comp.process(1.0e-4) / 1.0e-4;
        }
        assert!(
            (gain - target).abs() / target < 0.01,
            "Makeup {} after one block, target {}",
            gain,
            target
        );
    }

    #[test]
    fn test_makeup_ramp_follows_block_size() {
        let mut comp = DynamicsProcessor::new(SAMPLE_RATE);
        comp.set_block_size(64);
        comp.configure(0.8, SpeedMode::Glue);
        let target = db_to_linear(comp.settings().makeup_gain_db);
        for _ in 0..63 {
            comp.process(1.0e-4);
        }
        let gain = comp.process(1.0e-4) / 1.0e-4;
        assert!((gain - target).abs() / target < 1e-3);
    }

    #[test]
    fn test_reset_snaps_makeup() {
        let mut comp = DynamicsProcessor::new(SAMPLE_RATE);
        comp.configure(1.0, SpeedMode::Tame);
        comp.reset();
        let target = db_to_linear(comp.settings().makeup_gain_db);
        let gain = comp.process(0.001) / 0.001;
        assert!((gain - target).abs() / target < 1e-3);
    }

    #[test]
    fn test_time_coefficient() {
        assert_eq!(time_coefficient(0.0, SAMPLE_RATE), 0.0);
        let fast = time_coefficient(1.0, SAMPLE_RATE);
        let slow = time_coefficient(100.0, SAMPLE_RATE);
        assert!(fast < slow && slow < 1.0);
    }
}
