//! Two-Band Crossover
//!
//! Splits one signal into a low and a high band with a 4th-order
//! Linkwitz-Riley crossover: each band is two cascaded 2nd-order Butterworth
//! sections built from the RBJ cookbook. Both bands share the same phase
//! response, so `low + high` is an all-pass of the input: unity magnitude at
//! every frequency, no notch or bump at the crossover point.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type, Q_BUTTERWORTH_F32};

use crate::error::{check_sample_rate, DspError};

/// Lowest frequency any filter stage is tuned to (Hz)
pub const MIN_FREQUENCY_HZ: f32 = 20.0;

/// Highest usable cutoff as a fraction of the sample rate
///
/// Bilinear-transform designs blow up at exactly Nyquist.
pub const MAX_NYQUIST_RATIO: f32 = 0.49;

/// Valid cutoff range `[low, high]` for a sample rate
///
/// For absurdly low sample rates the lower bound follows the upper one down
/// so the range never inverts.
pub fn frequency_bounds(sample_rate: f32) -> (f32, f32) {
    let high = sample_rate * MAX_NYQUIST_RATIO;
    let low = MIN_FREQUENCY_HZ.min(high * 0.5);
    (low, high)
}

/// Clamp a requested cutoff into the realisable range for `sample_rate`
///
/// Non-finite requests fall back to the lower bound.
pub fn clamp_frequency(frequency: f32, sample_rate: f32) -> f32 {
    let (low, high) = frequency_bounds(sample_rate);
    if frequency.is_finite() {
        frequency.clamp(low, high)
    } else {
        low
    }
}

/// Build a Butterworth section of the given type at an already-clamped frequency
pub(crate) fn butterworth(
    filter: Type<f32>,
    frequency: f32,
    sample_rate: f32,
) -> Result<Coefficients<f32>, DspError> {
    Coefficients::<f32>::from_params(filter, sample_rate.hz(), frequency.hz(), Q_BUTTERWORTH_F32)
        .map_err(|_| DspError::InvalidCoefficients {
            frequency,
            sample_rate,
        })
}

/// Linkwitz-Riley band splitter for a single channel
///
/// Holds filter state, so each audio channel needs its own instance.
pub struct BandSplitter {
    lowpass: [DirectForm2Transposed<f32>; 2],
    highpass: [DirectForm2Transposed<f32>; 2],
    sample_rate: f32,
    cutoff: f32,
}

impl BandSplitter {
    /// Create a splitter; `cutoff` is clamped into the valid range
    pub fn new(sample_rate: f32, cutoff: f32) -> Result<Self, DspError> {
        let sample_rate = check_sample_rate(sample_rate)?;
        let cutoff = clamp_frequency(cutoff, sample_rate);
        let (lp, hp) = Self::coefficients(cutoff, sample_rate)?;

        Ok(Self {
            lowpass: [
                DirectForm2Transposed::<f32>::new(lp),
                DirectForm2Transposed::<f32>::new(lp),
            ],
            highpass: [
                DirectForm2Transposed::<f32>::new(hp),
                DirectForm2Transposed::<f32>::new(hp),
            ],
            sample_rate,
            cutoff,
        })
    }

    fn coefficients(
        cutoff: f32,
        sample_rate: f32,
    ) -> Result<(Coefficients<f32>, Coefficients<f32>), DspError> {
        let lp = butterworth(Type::LowPass, cutoff, sample_rate)?;
        let hp = butterworth(Type::HighPass, cutoff, sample_rate)?;
        Ok((lp, hp))
    }

    /// Retune the crossover point
    ///
    /// Call between blocks. Filter state is kept, so the transition is
    /// a short coefficient jump rather than a reset click. Requests outside
    /// the valid range are clamped; a design failure keeps the old tuning.
    pub fn set_cutoff(&mut self, frequency: f32) {
        let cutoff = clamp_frequency(frequency, self.sample_rate);
        if (cutoff - self.cutoff).abs() < 0.01 {
            return;
        }

        if let Ok((lp, hp)) = Self::coefficients(cutoff, self.sample_rate) {
            for filter in &mut self.lowpass {
                filter.update_coefficients(lp);
            }
            for filter in &mut self.highpass {
                filter.update_coefficients(hp);
            }
            self.cutoff = cutoff;
        }
    }

    /// Split one sample into `(low, high)`
    ///
    /// # Real-time Safety
    /// No allocations, O(1).
    #[inline]
    pub fn split(&mut self, input: f32) -> (f32, f32) {
        let low = self.lowpass[0].run(input);
        let low = self.lowpass[1].run(low);
        let high = self.highpass[0].run(input);
        let high = self.highpass[1].run(high);
        (low, high)
    }

    /// Current (clamped) crossover frequency in Hz
    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Clear delay lines (stream restart)
    pub fn reset(&mut self) {
        for filter in self.lowpass.iter_mut().chain(self.highpass.iter_mut()) {
            filter.reset_state();
        }
    }
}
