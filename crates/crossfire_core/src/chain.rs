//! Per-channel processing chain
//!
//! ```text
//!          ┌─ low ─▶ shape ─▶ [upward] ─▶ compress ─┐
//! x ─▶ split                                         + ─▶ tone ─▶ y
//!          └─ high ─▶ shape ─▶ [upward] ─▶ compress ─┘
//! ```
//!
//! The upward stage only runs in OTT speed mode. One chain per audio
//! channel; chains never share state, only the per-block settings.

use crossfire_dsp::{
    BandSplitter, DspError, DynamicsProcessor, ToneFilter, UpwardExpander, Waveshaper,
};

use crate::settings::ChainSettings;

const LOW: usize = 0;
const HIGH: usize = 1;

/// Complete two-band pipeline for one audio channel
pub struct ChannelChain {
    splitter: BandSplitter,
    shapers: [Waveshaper; 2],
    upward: [UpwardExpander; 2],
    dynamics: [DynamicsProcessor; 2],
    tone: ToneFilter,
    settings: ChainSettings,
}

impl ChannelChain {
    /// Build a chain at `sample_rate` already tuned to `settings`
    pub fn new(sample_rate: f32, settings: &ChainSettings) -> Result<Self, DspError> {
        let mut chain = Self {
            splitter: BandSplitter::new(sample_rate, settings.crossover_hz)?,
            shapers: [Waveshaper::new(), Waveshaper::new()],
            upward: [UpwardExpander::new(), UpwardExpander::new()],
            dynamics: [
                DynamicsProcessor::new(sample_rate),
                DynamicsProcessor::new(sample_rate),
            ],
            tone: ToneFilter::new(sample_rate, settings.tone_cutoff_hz)?,
            settings: *settings,
        };
        chain.apply(settings);
        chain.reset();
        Ok(chain)
    }

    /// Frames in the coming blocks; makeup ramps complete within one block
    pub fn set_block_size(&mut self, frames: usize) {
        for dynamics in &mut self.dynamics {
            dynamics.set_block_size(frames);
        }
    }

    /// Push one block's settings into every stage
    ///
    /// Called once per block before any sample. Allocation-free.
    pub fn apply(&mut self, settings: &ChainSettings) {
        self.splitter.set_cutoff(settings.crossover_hz);
        self.tone.set_cutoff(settings.tone_cutoff_hz);

        self.dynamics[LOW].configure(settings.comp_low, settings.speed);
        self.dynamics[HIGH].configure(settings.comp_high, settings.speed);
        self.upward[LOW].configure(settings.comp_low);
        self.upward[HIGH].configure(settings.comp_high);

        self.settings = *settings;
    }

    /// Run one sample through the whole chain
    ///
    /// # Real-time Safety
    /// No allocations, O(1).
    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        let settings = &self.settings;
        let (low, high) = self.splitter.split(x);

        let mut low = self.shapers[LOW].shape(low, settings.dist_low, settings.character);
        let mut high = self.shapers[HIGH].shape(high, settings.dist_high, settings.character);

        if settings.speed.upward_enabled() {
            low = self.upward[LOW].boost(low);
            high = self.upward[HIGH].boost(high);
        }

        let low = self.dynamics[LOW].process(low);
        let high = self.dynamics[HIGH].process(high);

        self.tone.process(low + high)
    }

    /// Process a planar channel buffer in place
    pub fn process(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    /// Clear every stage's history
    pub fn reset(&mut self) {
        self.splitter.reset();
        self.tone.reset();
        for shaper in &mut self.shapers {
            shaper.reset();
        }
        for dynamics in &mut self.dynamics {
            dynamics.reset();
        }
    }

    pub fn crossover_hz(&self) -> f32 {
        self.splitter.cutoff()
    }

    pub fn tone_cutoff_hz(&self) -> f32 {
        self.tone.cutoff()
    }

    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    /// Latest (low, high) gain reduction in dB
    pub fn gain_reduction_db(&self) -> (f32, f32) {
        (
            self.dynamics[LOW].gain_reduction_db(),
            self.dynamics[HIGH].gain_reduction_db(),
        )
    }
}
