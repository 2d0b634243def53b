//! Error types for the spectralwarp crate.

use std::fmt;

/// Errors that can occur on the offline/validating surface.
///
/// The real-time path never returns errors: invalid values are clamped and
/// numerical faults degrade to silence or pass-through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Sample rate is zero or otherwise unusable.
    InvalidSampleRate(u32),
    /// Stretch or pitch ratio outside the supported range.
    InvalidRatio(String),
    /// Input too short for a single analysis frame.
    InputTooShort { provided: usize, minimum: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidSampleRate(sr) => write!(f, "invalid sample rate: {}", sr),
            EngineError::InvalidRatio(msg) => write!(f, "invalid ratio: {}", msg),
            EngineError::InputTooShort { provided, minimum } => {
                write!(
                    f,
                    "input too short: {} samples provided, {} required",
                    provided, minimum
                )
            }
        }
    }
}

impl std::error::Error for EngineError {}
