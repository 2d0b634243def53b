#![forbid(unsafe_code)]
//! Real-time spectral phase-vocoder engine.
//!
//! `spectralwarp` independently time-stretches and pitch-shifts audio using
//! short-time Fourier analysis, instantaneous-frequency estimation,
//! identity phase locking, and energy-normalized overlap-add resynthesis,
//! with spectral smear/gate modifiers and a spectrum-freeze mode.
//!
//! # Real-time use
//!
//! The streaming engine implements the [`AudioEngine`] contract shared by
//! the surrounding effect suite: prepare once, then process in place from
//! the host's audio callback. Latency is fixed at [`FFT_SIZE`] samples.
//!
//! ```
//! use spectralwarp::{AudioEngine, ParamId, SpectralEngine};
//!
//! let mut engine = SpectralEngine::new();
//! engine.prepare(48000.0, 512);
//! engine.set_parameter(ParamId::Pitch as usize, 0.75); // +12 semitones
//!
//! let mut block = vec![0.0f32; 512];
//! let mut channels: Vec<&mut [f32]> = vec![&mut block];
//! engine.process(&mut channels);
//! assert_eq!(engine.latency_samples(), spectralwarp::FFT_SIZE);
//! ```
//!
//! # Offline use
//!
//! [`render`] stretches a whole buffer and returns the full-length result:
//!
//! ```
//! // 0.5 s of 440 Hz sine at 48 kHz, stretched to twice the duration
//! let input: Vec<f32> = (0..24000)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 48000.0).sin())
//!     .collect();
//! let output = spectralwarp::render(&input, 48000, 2.0, 1.0).unwrap();
//! assert!(output.len() > input.len());
//! ```

pub mod analysis;
pub mod core;
pub mod engine;
pub mod error;
pub mod spectral;

pub use analysis::TransientFollower;
pub use engine::AudioEngine;
pub use error::EngineError;
pub use spectral::{
    EngineParams, FreezeState, ParamId, PhaseVocoder, SpectralEngine, ANALYSIS_HOP, FFT_SIZE,
    NUM_BINS, NUM_PARAMS, OVERLAP_FACTOR,
};

use crate::error::EngineError as Error;

/// Stretches and pitch-shifts a whole mono buffer offline.
///
/// Convenience wrapper constructing a [`PhaseVocoder`] at the engine's
/// fixed transform size. `stretch_ratio` must lie in 0.25–4.0 and
/// `pitch_ratio` in 0.5–2.0.
pub fn render(
    input: &[f32],
    sample_rate: u32,
    stretch_ratio: f64,
    pitch_ratio: f64,
) -> Result<Vec<f32>, Error> {
    if sample_rate == 0 {
        return Err(Error::InvalidSampleRate(sample_rate));
    }
    let mut vocoder = PhaseVocoder::new(FFT_SIZE, ANALYSIS_HOP);
    vocoder.process(input, stretch_ratio, pitch_ratio)
}
