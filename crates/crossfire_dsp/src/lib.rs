//! Crossfire DSP - Real-time building blocks for the two-band effects chain
//!
//! This crate provides every per-sample stage of the multiband processor:
//! - Linkwitz-Riley 4th-order band splitter
//! - Three-character waveshaping distortion
//! - Downward compressor with speed modes and makeup gain
//! - Quartic soft-knee upward compression (OTT)
//! - Output tone low-pass
//! - FFT spectrum analyzer with a lock-free reader handle
//!
//! # Architecture
//!
//! Every stage is plain owned state with no interior locking. Coefficients
//! and derived settings are recomputed once per block on the audio thread;
//! the per-sample methods never allocate and never fail.

mod crossover;
mod dynamics;
mod error;
mod fft;
mod processor;
mod smoothing;
mod tone;
mod upward;
mod waveshaper;

pub use crossover::{
    clamp_frequency, frequency_bounds, BandSplitter, MAX_NYQUIST_RATIO, MIN_FREQUENCY_HZ,
};
pub use dynamics::{CompressorSettings, DynamicsProcessor, MakeupCurve, SpeedMode};
pub use error::DspError;
pub use fft::{
    SpectrumAnalyzer, SpectrumBins, SpectrumReader, FFT_ORDER, FFT_SIZE, FLOOR_DB,
    MIN_ANALYSIS_HZ, NUM_BINS,
};
pub use processor::{AudioProcessor, ProcessContext};
pub use smoothing::SmoothedValue;
pub use tone::ToneFilter;
pub use upward::{upward_boost, UpwardExpander, UpwardSettings};
pub use waveshaper::{drive_from_intensity, three_way, Character, ShapeTuning, Waveshaper};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_exports() {
        // Verify all public types are accessible
        let _splitter = BandSplitter::new(48000.0, 750.0).unwrap();
        let _tone = ToneFilter::new(48000.0, 20000.0).unwrap();
        let _shaper = Waveshaper::new();
        let _comp = DynamicsProcessor::new(48000.0);
        let _up = UpwardExpander::new();
        let (_analyzer, _reader) = SpectrumAnalyzer::new(48000.0).unwrap();
    }
}
