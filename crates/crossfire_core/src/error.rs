//! Engine Error Types

use thiserror::Error;

/// Errors raised on the engine's control path
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine configuration error: {0}")]
    ConfigError(String),

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("DSP error: {0}")]
    Dsp(#[from] crossfire_dsp::DspError),
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
