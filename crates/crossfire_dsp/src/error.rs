//! DSP Error Types

use thiserror::Error;

/// Errors that can occur while building DSP stages
///
/// Only raised on the control path (construction, `prepare`). The per-sample
/// path never fails; out-of-range inputs are clamped instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DspError {
    #[error("Invalid filter coefficients for frequency {frequency}Hz at sample rate {sample_rate}Hz")]
    InvalidCoefficients { frequency: f32, sample_rate: f32 },

    #[error("Sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("Buffer size mismatch: expected at most {expected}, got {got}")]
    BufferSizeMismatch { expected: usize, got: usize },
}

/// Reject sample rates no filter can be designed for
pub(crate) fn check_sample_rate(sample_rate: f32) -> Result<f32, DspError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(sample_rate)
    } else {
        Err(DspError::InvalidSampleRate(sample_rate))
    }
}
