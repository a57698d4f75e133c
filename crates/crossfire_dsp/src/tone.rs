//! Output Tone Filter
//!
//! A single Butterworth low-pass applied after the two bands are summed.
//! The cutoff comes straight from a parameter; coefficients are redesigned
//! once per block at the current sample rate.

use biquad::{Biquad, DirectForm2Transposed, Type};

use crate::crossover::{butterworth, clamp_frequency};
use crate::error::{check_sample_rate, DspError};

/// Final low-pass stage for one channel
pub struct ToneFilter {
    filter: DirectForm2Transposed<f32>,
    sample_rate: f32,
    cutoff: f32,
}

impl ToneFilter {
    pub fn new(sample_rate: f32, cutoff: f32) -> Result<Self, DspError> {
        let sample_rate = check_sample_rate(sample_rate)?;
        let cutoff = clamp_frequency(cutoff, sample_rate);
        let coeffs = butterworth(Type::LowPass, cutoff, sample_rate)?;

        Ok(Self {
            filter: DirectForm2Transposed::<f32>::new(coeffs),
            sample_rate,
            cutoff,
        })
    }

    /// Retune the low-pass; clamped like the crossover
    pub fn set_cutoff(&mut self, frequency: f32) {
        let cutoff = clamp_frequency(frequency, self.sample_rate);
        if (cutoff - self.cutoff).abs() < 0.01 {
            return;
        }

        if let Ok(coeffs) = butterworth(Type::LowPass, cutoff, self.sample_rate) {
            self.filter.update_coefficients(coeffs);
            self.cutoff = cutoff;
        }
    }

    #[inline]
    pub fn process(&mut self, sample: f32) -> f32 {
        self.filter.run(sample)
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn reset(&mut self) {
        self.filter.reset_state();
    }
}
