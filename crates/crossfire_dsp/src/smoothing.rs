//! Per-sample value smoothing
//!
//! Block-rate parameter updates land as steps; this linear ramp spreads each
//! step over a fixed number of samples to avoid zipper noise. Setting the
//! ramp length to the block size makes a change complete within the block
//! it was applied in.

/// Linear ramp toward a target value over a fixed sample count
#[derive(Debug, Clone, Copy)]
pub struct SmoothedValue {
    current: f32,
    target: f32,
    step: f32,
    remaining: usize,
    /// Samples taken by each new ramp
    ramp_samples: usize,
}

impl SmoothedValue {
    pub fn new(initial: f32, ramp_samples: usize) -> Self {
        Self {
            current: initial,
            target: initial,
            step: 0.0,
            remaining: 0,
            ramp_samples,
        }
    }

    /// Change the length of subsequent ramps; a ramp in flight keeps its pace
    pub fn set_ramp_samples(&mut self, ramp_samples: usize) {
        self.ramp_samples = ramp_samples;
    }

    pub fn ramp_samples(&self) -> usize {
        self.ramp_samples
    }

    /// Start a ramp from the current value to `target`
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;
        if self.ramp_samples == 0 {
            self.snap();
        } else {
            self.remaining = self.ramp_samples;
            self.step = (target - self.current) / self.ramp_samples as f32;
        }
    }

    /// Advance one sample
    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.remaining > 0 {
            self.remaining -= 1;
            self.current = if self.remaining == 0 {
                self.target
            } else {
                self.current + self.step
            };
        }
        self.current
    }

    /// Jump straight to the target
    pub fn snap(&mut self) {
        self.current = self.target;
        self.remaining = 0;
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn is_smoothing(&self) -> bool {
        self.remaining > 0
    }
}
