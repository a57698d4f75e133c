//! Per-block settings snapshot
//!
//! Read every parameter exactly once at the top of a block, so all channels
//! and all samples of that block see the same values even while the UI keeps
//! writing.

use crossfire_dsp::{Character, SpeedMode};

use crate::params::{ParamId, ParameterStore};

/// Everything a [`ChannelChain`](crate::ChannelChain) needs for one block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainSettings {
    pub crossover_hz: f32,
    pub comp_low: f32,
    pub comp_high: f32,
    pub dist_low: f32,
    pub dist_high: f32,
    pub speed: SpeedMode,
    pub character: Character,
    pub tone_cutoff_hz: f32,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self::from_store(&ParameterStore::new())
    }
}

impl ChainSettings {
    pub fn from_store(store: &ParameterStore) -> Self {
        Self {
            crossover_hz: store.get(ParamId::BandsplitFrequency),
            comp_low: store.get(ParamId::CompLowIntensity),
            comp_high: store.get(ParamId::CompHighIntensity),
            dist_low: store.get(ParamId::DistLowIntensity),
            dist_high: store.get(ParamId::DistHighIntensity),
            speed: SpeedMode::from_control(store.get(ParamId::CompressorSpeed)),
            character: Character::from_control(store.get(ParamId::DistortionType)),
            tone_cutoff_hz: store.get(ParamId::ToneFilterCutoff),
        }
    }
}
