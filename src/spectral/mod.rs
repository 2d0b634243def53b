//! The spectral phase-vocoder engine and its building blocks.

pub mod engine;
pub mod freeze;
pub mod modifiers;
pub mod params;
pub mod phase_locking;
pub mod vocoder;

pub use engine::SpectralEngine;
pub use freeze::FreezeState;
pub use params::{EngineParams, ParamId, NUM_PARAMS};
pub use vocoder::PhaseVocoder;

/// Transform size in samples; also the fixed engine latency.
pub const FFT_SIZE: usize = 2048;

/// Analysis hop in samples (75 % overlap, factor 4).
pub const ANALYSIS_HOP: usize = 512;

/// Overlapping frames contributing to each output sample at unity stretch.
pub const OVERLAP_FACTOR: usize = FFT_SIZE / ANALYSIS_HOP;

/// Spectral bins carried per frame.
pub const NUM_BINS: usize = FFT_SIZE / 2 + 1;

/// Input/output ring capacity; tolerates worst-case host block sizes.
pub const RING_CAPACITY: usize = FFT_SIZE * 8;

/// Persistent per-bin state is flushed of denormals every this many frames.
pub const DENORMAL_FLUSH_INTERVAL: u32 = 256;
