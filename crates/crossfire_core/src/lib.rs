//! Crossfire Core - Multiband Engine
//!
//! This crate turns the DSP stages into a host-facing processor:
//! - Lock-free parameter store shared between UI and audio threads
//! - Per-block settings snapshot and per-channel processing chains
//! - Block and interleaved entry points with spectrum publication
//! - Editor-side display helpers
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     UI / Host Thread                        │
//! │  ParameterStore::set ──▶ atomics     SpectrumReader ◀──┐    │
//! └─────────────────────────────────────────────────────────│───┘
//!                              │                           │ triple buffer
//!                              ▼                           │
//! ┌─────────────────────────────────────────────────────────│───┐
//! │                      Audio Thread                       │   │
//! │   snapshot ──▶ ChannelChain × channels ──▶ SpectrumAnalyzer │
//! │              (Zero allocation in this path)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod chain;
mod config;
mod display;
mod engine;
mod error;
mod params;
mod settings;

pub use chain::ChannelChain;
pub use config::EngineConfig;
pub use display::{
    frequency_to_position, intensity_to_radius, position_to_frequency, radius_to_intensity,
    DisplayFollower, DISPLAY_MAX_HZ, DISPLAY_MIN_HZ, MAX_RADIUS, MIN_RADIUS,
};
pub use engine::MultibandProcessor;
pub use error::{EngineError, EngineResult};
pub use params::{
    ParamChange, ParamId, ParameterSpec, ParameterStore, LISTENER_CAPACITY, PARAMETER_SPECS,
};
pub use settings::ChainSettings;

// Re-export DSP types for convenience
pub use crossfire_dsp::{
    AudioProcessor, Character, ProcessContext, SpectrumBins, SpectrumReader, SpeedMode, FLOOR_DB,
    NUM_BINS,
};
