//! Multiband Processor - Host Entry Point
//!
//! Owns one [`ChannelChain`] per active channel and the spectrum analyzer,
//! and drives them block by block.
//!
//! # Architecture
//!
//! ```text
//! UI / host thread                       Audio thread
//! ────────────────                       ────────────
//! ParameterStore::set ──atomics──▶ process_block
//!                                          │ 1. snapshot ChainSettings
//!                                          │ 2. apply to every chain
//!                                          │ 3. per-sample pipeline
//!                                          │ 4. clear extra channels
//!                                          │ 5. feed analyzer, FFT step
//! SpectrumReader ◀──triple buffer──────────┘
//! ```
//!
//! `new` and `prepare` are the only places that allocate; `process_block`
//! and the interleaved [`AudioProcessor::process`] never allocate, lock or
//! log.

use std::sync::Arc;

use tracing::{debug, info};

use crossfire_dsp::{AudioProcessor, DspError, ProcessContext, SpectrumAnalyzer, SpectrumReader};

use crate::chain::ChannelChain;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::params::ParameterStore;
use crate::settings::ChainSettings;

/// Two-band effects processor for up to two channels
pub struct MultibandProcessor {
    params: Arc<ParameterStore>,
    config: EngineConfig,
    chains: Vec<ChannelChain>,
    analyzer: SpectrumAnalyzer,
    settings: ChainSettings,
}

impl MultibandProcessor {
    /// Build a processor prepared for `config`
    ///
    /// Returns the reader the visualizer polls for spectrum frames.
    pub fn new(
        params: Arc<ParameterStore>,
        config: &EngineConfig,
    ) -> EngineResult<(Self, SpectrumReader)> {
        config.validate().map_err(EngineError::ConfigError)?;

        let sample_rate = config.sample_rate as f32;
        let settings = ChainSettings::from_store(&params);
        let chains = Self::build_chains(sample_rate, config.channels, &settings)?;
        let (analyzer, reader) = SpectrumAnalyzer::new(sample_rate)?;

        info!(
            "Multiband processor created: {} Hz, {} frames, {} channel(s)",
            config.sample_rate, config.max_block_size, config.channels
        );

        Ok((
            Self {
                params,
                config: config.clone(),
                chains,
                analyzer,
                settings,
            },
            reader,
        ))
    }

    fn build_chains(
        sample_rate: f32,
        channels: usize,
        settings: &ChainSettings,
    ) -> Result<Vec<ChannelChain>, DspError> {
        (0..channels)
            .map(|_| ChannelChain::new(sample_rate, settings))
            .collect()
    }

    /// Re-prepare for a new sample rate / block size
    ///
    /// Rebuilds every chain, so all filter, envelope and spectrum state is
    /// cleared. Call from the control thread while the stream is stopped.
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) -> EngineResult<()> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(DspError::InvalidSampleRate(sample_rate).into());
        }

        let config = EngineConfig {
            sample_rate: sample_rate.round() as u32,
            max_block_size,
            channels: self.config.channels,
        };
        config.validate().map_err(EngineError::ConfigError)?;

        let settings = ChainSettings::from_store(&self.params);
        self.chains = Self::build_chains(sample_rate, config.channels, &settings)?;
        self.analyzer.prepare(sample_rate)?;
        self.settings = settings;
        self.config = config;

        info!(
            "Prepared: {} Hz, {} frames ({:.2} ms), {} channel(s), crossover {} Hz",
            sample_rate,
            max_block_size,
            self.config.block_duration_ms(),
            self.config.channels,
            self.settings.crossover_hz
        );
        Ok(())
    }

    /// Snapshot parameters and push them into every chain
    ///
    /// Gain ramps span `frames`, so a change is fully applied by the end of
    /// this block.
    fn begin_block(&mut self, frames: usize) {
        self.settings = ChainSettings::from_store(&self.params);
        for chain in &mut self.chains {
            chain.set_block_size(frames);
            chain.apply(&self.settings);
        }
    }

    /// Process a planar block in place
    ///
    /// Channels beyond the configured count are cleared. Every channel must
    /// hold the same number of frames, at most `max_block_size`.
    pub fn process_block(&mut self, channels: &mut [&mut [f32]]) {
        let frames = channels.first().map_or(0, |channel| channel.len());
        debug_assert!(
            frames <= self.config.max_block_size,
            "block of {} frames exceeds prepared maximum {}",
            frames,
            self.config.max_block_size
        );
        debug_assert!(channels.iter().all(|channel| channel.len() == frames));

        self.begin_block(frames);

        let active = self.chains.len().min(channels.len());
        for (chain, buffer) in self.chains.iter_mut().zip(channels.iter_mut()) {
            chain.process(buffer);
        }
        for extra in channels.iter_mut().skip(active) {
            extra.fill(0.0);
        }

        if active > 0 {
            let scale = 1.0 / active as f32;
            for frame in 0..frames {
                let sum: f32 = channels[..active]
                    .iter()
                    .map(|channel| channel.get(frame).copied().unwrap_or(0.0))
                    .sum();
                self.analyzer.push_sample(sum * scale);
            }
        }
        self.analyzer.produce_fft_data();
    }

    /// Clear all filter, envelope and spectrum state without re-preparing
    pub fn reset(&mut self) {
        for chain in &mut self.chains {
            chain.reset();
        }
        self.analyzer.reset();
        debug!("Processor state reset");
    }

    pub fn params(&self) -> &Arc<ParameterStore> {
        &self.params
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Settings used by the most recent block
    pub fn settings(&self) -> &ChainSettings {
        &self.settings
    }

    pub fn chain(&self, channel: usize) -> Option<&ChannelChain> {
        self.chains.get(channel)
    }

    /// Crossover frequency the filters are currently tuned to
    pub fn crossover_hz(&self) -> f32 {
        self.chains
            .first()
            .map_or(self.settings.crossover_hz, |chain| chain.crossover_hz())
    }

    /// Largest (low, high) gain reduction across channels, in dB
    pub fn gain_reduction_db(&self) -> (f32, f32) {
        self.chains.iter().fold((0.0_f32, 0.0_f32), |acc, chain| {
            let (low, high) = chain.gain_reduction_db();
            (acc.0.max(low), acc.1.max(high))
        })
    }
}

impl AudioProcessor for MultibandProcessor {
    /// Interleaved entry point; `context.channels` gives the frame layout
    fn process(&mut self, buffer: &mut [f32], context: &ProcessContext) {
        let stride = context.channels.max(1);
        debug_assert!(context.frames_in(buffer.len()).is_ok());

        self.begin_block(buffer.len() / stride);

        let active = self.chains.len().min(stride);
        let scale = if active > 0 { 1.0 / active as f32 } else { 0.0 };
        for frame in buffer.chunks_exact_mut(stride) {
            let mut sum = 0.0;
            for (channel, sample) in frame.iter_mut().enumerate() {
                match self.chains.get_mut(channel) {
                    Some(chain) => {
                        *sample = chain.process_sample(*sample);
                        sum += *sample;
                    }
                    None => *sample = 0.0,
                }
            }
            if active > 0 {
                self.analyzer.push_sample(sum * scale);
            }
        }
        self.analyzer.produce_fft_data();
    }

    fn reset(&mut self) {
        MultibandProcessor::reset(self);
    }

    fn name(&self) -> &'static str {
        "Crossfire Multiband"
    }
}
