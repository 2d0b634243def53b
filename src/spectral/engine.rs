//! Real-time streaming wrapper around the phase-vocoder core.
//!
//! Accepts arbitrary host block sizes, segments them into analysis hops
//! (running zero or more frames per call), overlap-adds synthesis frames
//! into an output ring with a parallel window-energy accumulator, and
//! reads normalized samples back out at the host rate. Latency is fixed at
//! `FFT_SIZE` samples.

use crate::analysis::TransientFollower;
use crate::core::fft::NORM_EPSILON;
use crate::core::safety::scrub_non_finite;
use crate::core::window::hann_window;
use crate::core::SampleRing;
use crate::engine::AudioEngine;
use crate::spectral::params::EngineParams;
use crate::spectral::vocoder::{FrameSettings, PhaseVocoder};
use crate::spectral::{ANALYSIS_HOP, FFT_SIZE, RING_CAPACITY};

/// Channels processed independently; anything beyond is passed through.
const MAX_CHANNELS: usize = 2;

/// Per-channel streaming state.
struct ChannelState {
    vocoder: PhaseVocoder,
    input: SampleRing,
    /// Trailing `FFT_SIZE` input samples, shifted by one hop per frame.
    frame_buf: Vec<f32>,
    hop_buf: Vec<f32>,
    frame_out: Vec<f32>,
    /// Overlap-add accumulator ring.
    ola: Vec<f32>,
    /// Parallel squared-synthesis-window accumulator.
    norm: Vec<f32>,
    read_pos: usize,
    write_pos: usize,
    /// Final samples between read and write positions.
    pending: usize,
    warmup_remaining: usize,
}

#[inline]
fn wrap(index: usize, capacity: usize) -> usize {
    if index >= capacity {
        index - capacity
    } else {
        index
    }
}

impl ChannelState {
    fn new() -> Self {
        let mut ch = Self {
            vocoder: PhaseVocoder::new(FFT_SIZE, ANALYSIS_HOP),
            input: SampleRing::with_capacity(RING_CAPACITY),
            frame_buf: vec![0.0; FFT_SIZE],
            hop_buf: vec![0.0; ANALYSIS_HOP],
            frame_out: vec![0.0; FFT_SIZE],
            ola: vec![0.0; RING_CAPACITY],
            norm: vec![0.0; RING_CAPACITY],
            read_pos: 0,
            write_pos: 0,
            pending: 0,
            warmup_remaining: 0,
        };
        ch.reset();
        ch
    }

    fn reset(&mut self) {
        self.vocoder.reset();
        self.input.clear();
        self.frame_buf.iter_mut().for_each(|s| *s = 0.0);
        self.ola.iter_mut().for_each(|s| *s = 0.0);
        self.norm.iter_mut().for_each(|s| *s = 0.0);
        self.read_pos = 0;
        // Offsetting the first frame base by one hop makes the stream
        // delay land on exactly FFT_SIZE samples.
        self.write_pos = ANALYSIS_HOP;
        self.pending = ANALYSIS_HOP;
        self.warmup_remaining = FFT_SIZE;
    }

    /// Buffers host input, dropping oldest on overrun.
    fn push_input(&mut self, samples: &[f32]) {
        if self.input.available() < samples.len() {
            self.input.discard(samples.len() - self.input.available());
        }
        self.input.push_slice(samples);
    }

    /// Runs analysis/synthesis cycles while a full hop is buffered and the
    /// output ring has room for a frame.
    fn run_frames(&mut self, params: &EngineParams, window_sq: &[f32]) {
        while self.input.len() >= ANALYSIS_HOP {
            if self.pending + FFT_SIZE > RING_CAPACITY {
                // Synthesis has outpaced consumption (stretch > 1); stall
                // analysis until the host drains the output ring.
                break;
            }

            // Parameters snapshot once per frame boundary.
            let synthesis_hop =
                ((ANALYSIS_HOP as f64 * params.stretch_ratio()).round() as usize).max(1);
            let settings = FrameSettings {
                synthesis_hop,
                pitch_ratio: params.pitch_ratio(),
                smear_bins: params.smear_bins(),
                gate_threshold: params.gate_threshold(),
                phase_reset: params.phase_reset(),
            };
            self.vocoder.set_freeze(params.freeze_enabled());

            self.frame_buf.copy_within(ANALYSIS_HOP.., 0);
            self.input.pop_slice(&mut self.hop_buf);
            self.frame_buf[FFT_SIZE - ANALYSIS_HOP..].copy_from_slice(&self.hop_buf);

            self.vocoder
                .process_frame(&self.frame_buf, &settings, &mut self.frame_out);

            for i in 0..FFT_SIZE {
                let idx = wrap(self.write_pos + i, RING_CAPACITY);
                self.ola[idx] += self.frame_out[i];
                self.norm[idx] += window_sq[i];
            }
            self.write_pos = wrap(self.write_pos + synthesis_hop, RING_CAPACITY);
            self.pending += synthesis_hop;
        }
    }

    /// Reads one normalized output sample, or silence on underrun.
    fn read_sample(&mut self) -> f32 {
        let value = if self.pending > 0 {
            let idx = self.read_pos;
            let ws = self.norm[idx];
            let v = if ws > NORM_EPSILON {
                self.ola[idx] / ws
            } else {
                0.0
            };
            self.ola[idx] = 0.0;
            self.norm[idx] = 0.0;
            self.read_pos = wrap(self.read_pos + 1, RING_CAPACITY);
            self.pending -= 1;
            v
        } else {
            0.0
        };

        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return 0.0;
        }
        value
    }
}

/// Spectral phase-vocoder engine: streaming time-stretch, pitch-shift,
/// spectral smear/gate, and spectrum freeze behind the [`AudioEngine`]
/// contract.
pub struct SpectralEngine {
    params: EngineParams,
    channels: Vec<ChannelState>,
    window_sq: Vec<f32>,
    follower: TransientFollower,
    sample_rate: f64,
    prepared: bool,
}

impl Default for SpectralEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralEngine {
    /// Creates an unprepared engine; call [`AudioEngine::prepare`] before
    /// processing.
    pub fn new() -> Self {
        Self {
            params: EngineParams::default(),
            channels: Vec::new(),
            window_sq: Vec::new(),
            follower: TransientFollower::new(1.0, 100.0, 48000.0),
            sample_rate: 0.0,
            prepared: false,
        }
    }

    /// Current transient-follower envelope (extension point; feeds nothing
    /// in the spectral path).
    pub fn transient_envelope(&self) -> f32 {
        self.follower.envelope()
    }
}

impl AudioEngine for SpectralEngine {
    fn prepare(&mut self, sample_rate: f64, _max_block_size: usize) {
        self.sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            48000.0
        };
        self.channels = (0..MAX_CHANNELS).map(|_| ChannelState::new()).collect();
        self.window_sq = hann_window(FFT_SIZE).iter().map(|w| w * w).collect();
        self.follower = TransientFollower::new(
            self.params.attack_ms(),
            self.params.release_ms(),
            self.sample_rate as f32,
        );
        self.prepared = true;
    }

    fn process(&mut self, buffer: &mut [&mut [f32]]) {
        if !self.prepared || buffer.is_empty() {
            return;
        }

        let params = self.params;
        self.follower
            .set_times(params.attack_ms(), params.release_ms(), self.sample_rate as f32);
        self.follower.process(&*buffer[0]);

        if params.is_bypassed() {
            // Fully dry: skip every spectral stage, leave input untouched.
            return;
        }

        let mix = params.mix();
        let dry_gain = 1.0 - mix;

        for (ch, data) in buffer.iter_mut().take(MAX_CHANNELS).enumerate() {
            let state = &mut self.channels[ch];
            state.push_input(data);
            state.run_frames(&params, &self.window_sq);

            for sample in data.iter_mut() {
                let wet = state.read_sample();
                *sample = *sample * dry_gain + wet * mix;
            }
            scrub_non_finite(data);
        }
    }

    fn reset(&mut self) {
        for ch in &mut self.channels {
            ch.reset();
        }
        self.follower.reset();
    }

    fn set_parameter(&mut self, index: usize, value: f32) {
        self.params.set(index, value);
    }

    fn latency_samples(&self) -> usize {
        FFT_SIZE
    }
}
