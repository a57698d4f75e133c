//! Engine Configuration

use serde::{Deserialize, Serialize};

use crossfire_dsp::ProcessContext;

/// Stream description the engine is prepared for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sample rate in Hz (e.g., 44100, 48000, 96000)
    pub sample_rate: u32,

    /// Largest block the host will deliver, in frames
    pub max_block_size: usize,

    /// Active channels (1 = mono, 2 = stereo)
    pub channels: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            max_block_size: 512,
            channels: 2,
        }
    }
}

impl EngineConfig {
    /// Small blocks, ~2.9 ms at 44.1kHz
    pub fn low_latency() -> Self {
        Self {
            max_block_size: 128,
            ..Self::default()
        }
    }

    /// Large blocks, ~23 ms at 44.1kHz
    pub fn stable() -> Self {
        Self {
            max_block_size: 1024,
            ..Self::default()
        }
    }

    /// Duration of one full block in milliseconds
    pub fn block_duration_ms(&self) -> f32 {
        (self.max_block_size as f32 / self.sample_rate as f32) * 1000.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate < 8000 || self.sample_rate > 192000 {
            return Err(format!("Invalid sample rate: {}", self.sample_rate));
        }
        if self.channels == 0 || self.channels > 2 {
            return Err(format!("Invalid channel count: {}", self.channels));
        }
        if self.max_block_size < 16 || self.max_block_size > 8192 {
            return Err(format!("Invalid block size: {}", self.max_block_size));
        }
        Ok(())
    }

    pub fn process_context(&self) -> ProcessContext {
        ProcessContext::new(self.sample_rate as f32, self.channels, self.max_block_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.sample_rate, 44100);
        assert_eq!(config.max_block_size, 512);
        assert_eq!(config.channels, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_block_duration() {
        let config = EngineConfig {
            sample_rate: 48000,
            max_block_size: 480, // Exactly 10ms at 48kHz
            channels: 2,
        };
        assert!((config.block_duration_ms() - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_validation() {
        let invalid_rate = EngineConfig {
            sample_rate: 100,
            ..Default::default()
        };
        assert!(invalid_rate.validate().is_err());

        let invalid_channels = EngineConfig {
            channels: 3,
            ..Default::default()
        };
        assert!(invalid_channels.validate().is_err());

        let no_channels = EngineConfig {
            channels: 0,
            ..Default::default()
        };
        assert!(no_channels.validate().is_err());

        let invalid_block = EngineConfig {
            max_block_size: 8,
            ..Default::default()
        };
        assert!(invalid_block.validate().is_err());

        let mono = EngineConfig {
            channels: 1,
            ..Default::default()
        };
        assert!(mono.validate().is_ok());
    }

    #[test]
    fn test_preset_configs() {
        let low_latency = EngineConfig::low_latency();
        let stable = EngineConfig::stable();

        assert!(low_latency.max_block_size < stable.max_block_size);
        assert!(low_latency.block_duration_ms() < stable.block_duration_ms());
        assert!(low_latency.validate().is_ok());
        assert!(stable.validate().is_ok());
    }

    #[test]
    fn test_process_context() {
        let ctx = EngineConfig::default().process_context();
        assert_eq!(ctx.sample_rate, 44100.0);
        assert_eq!(ctx.channels, 2);
        assert_eq!(ctx.buffer_size, 512);
    }

    #[test]
    fn test_config_serialization() {
        let config = EngineConfig::stable();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, deserialized);
    }
}
