//! Phase-vocoder core: analysis, phase advancement, locking, modifiers,
//! and resynthesis of a single frame, plus the offline whole-buffer path.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::core::fft::{round_trip_gain, COMPLEX_ZERO, NORM_EPSILON};
use crate::core::safety::flush_denormals;
use crate::core::window::hann_window;
use crate::error::EngineError;
use crate::spectral::freeze::{FreezeState, FreezeUnit};
use crate::spectral::modifiers::{gate_magnitudes, smear_magnitudes};
use crate::spectral::phase_locking::{find_peaks, lock_to_peaks};
use crate::spectral::DENORMAL_FLUSH_INTERVAL;

const TWO_PI: f32 = 2.0 * PI;

/// Per-frame settings, snapshotted by the caller at the hop boundary.
#[derive(Debug, Clone, Copy)]
pub struct FrameSettings {
    /// Synthesis hop in samples (analysis hop scaled by the stretch ratio).
    pub synthesis_hop: usize,
    /// Pitch ratio applied to the per-bin phase advance.
    pub pitch_ratio: f64,
    /// Smear half-width in bins (0 disables).
    pub smear_bins: usize,
    /// Gate threshold on squared-normalized magnitude (0 disables).
    pub gate_threshold: f32,
    /// Phase randomization amount, active only while frozen.
    pub phase_reset: f32,
}

impl FrameSettings {
    /// Neutral settings for a given analysis hop.
    pub fn neutral(analysis_hop: usize) -> Self {
        Self {
            synthesis_hop: analysis_hop,
            pitch_ratio: 1.0,
            smear_bins: 0,
            gate_threshold: 0.0,
            phase_reset: 0.0,
        }
    }
}

/// Streaming phase-vocoder state for one audio channel.
pub struct PhaseVocoder {
    fft_size: usize,
    hop_analysis: usize,
    forward: Arc<dyn Fft<f32>>,
    inverse: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    /// Residual forward+inverse round-trip scale, measured once.
    synthesis_gain: f32,
    /// Expected per-hop phase advance at each bin center.
    center_advance: Vec<f32>,
    /// Previous live analysis phase per bin.
    prev_phase: Vec<f32>,
    /// Synthesis phase accumulator per bin; persists across frames.
    phase_accum: Vec<f32>,
    magnitudes: Vec<f32>,
    analysis_phases: Vec<f32>,
    synthesis_phases: Vec<f32>,
    /// Per-hop instantaneous advance per bin.
    inst_advance: Vec<f32>,
    /// Pitch-shift remap targets, reused across frames.
    shift_mags: Vec<f32>,
    shift_advance: Vec<f32>,
    shift_phases: Vec<f32>,
    peaks: Vec<usize>,
    scratch: Vec<f32>,
    fft_buffer: Vec<Complex<f32>>,
    freeze: FreezeUnit,
    frames_processed: u32,
}

impl PhaseVocoder {
    /// Creates a vocoder for the given transform size and analysis hop.
    ///
    /// Runs the one-time impulse calibration so any residual transform
    /// round-trip scale is folded into the synthesis gain exactly once.
    pub fn new(fft_size: usize, hop_analysis: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(fft_size);
        let inverse = planner.plan_fft_inverse(fft_size);
        let synthesis_gain = round_trip_gain(&mut planner, fft_size);

        let num_bins = fft_size / 2 + 1;
        let center_advance: Vec<f32> = (0..num_bins)
            .map(|bin| TWO_PI * bin as f32 * hop_analysis as f32 / fft_size as f32)
            .collect();

        Self {
            fft_size,
            hop_analysis,
            forward,
            inverse,
            window: hann_window(fft_size),
            synthesis_gain,
            center_advance,
            prev_phase: vec![0.0; num_bins],
            phase_accum: vec![0.0; num_bins],
            magnitudes: vec![0.0; num_bins],
            analysis_phases: vec![0.0; num_bins],
            synthesis_phases: vec![0.0; num_bins],
            inst_advance: vec![0.0; num_bins],
            shift_mags: vec![0.0; num_bins],
            shift_advance: vec![0.0; num_bins],
            shift_phases: vec![0.0; num_bins],
            peaks: Vec::with_capacity(num_bins / 4),
            scratch: vec![0.0; num_bins],
            fft_buffer: vec![COMPLEX_ZERO; fft_size],
            freeze: FreezeUnit::new(num_bins),
            frames_processed: 0,
        }
    }

    /// Transform size.
    #[inline]
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Analysis hop.
    #[inline]
    pub fn hop_analysis(&self) -> usize {
        self.hop_analysis
    }

    /// Measured synthesis gain (1/N for an unnormalized transform pair).
    #[inline]
    pub fn synthesis_gain(&self) -> f32 {
        self.synthesis_gain
    }

    /// Requests freeze on or off.
    pub fn set_freeze(&mut self, enabled: bool) {
        self.freeze.set_enabled(enabled);
    }

    /// Current freeze state.
    pub fn freeze_state(&self) -> FreezeState {
        self.freeze.state()
    }

    /// Clears all persistent per-bin state to the post-construction baseline.
    pub fn reset(&mut self) {
        self.prev_phase.iter_mut().for_each(|p| *p = 0.0);
        self.phase_accum.iter_mut().for_each(|p| *p = 0.0);
        self.inst_advance.iter_mut().for_each(|f| *f = 0.0);
        self.freeze.reset();
        self.frames_processed = 0;
    }

    /// Runs the full pipeline on one analysis frame.
    ///
    /// `frame` holds the trailing `fft_size` input samples; `out` receives
    /// the windowed, gain-corrected synthesis frame ready for overlap-add.
    pub fn process_frame(&mut self, frame: &[f32], settings: &FrameSettings, out: &mut [f32]) {
        debug_assert_eq!(frame.len(), self.fft_size);
        debug_assert_eq!(out.len(), self.fft_size);

        self.analyze(frame);
        self.freeze.apply(
            &mut self.magnitudes,
            &mut self.analysis_phases,
            &mut self.inst_advance,
            &self.center_advance,
            settings.phase_reset,
        );
        if (settings.pitch_ratio - 1.0).abs() > 1e-9 {
            self.remap_pitch(settings.pitch_ratio);
        }
        self.advance_and_lock(settings);
        smear_magnitudes(&mut self.magnitudes, settings.smear_bins, &mut self.scratch);
        gate_magnitudes(&mut self.magnitudes, settings.gate_threshold);
        self.synthesize(out);

        self.frames_processed = self.frames_processed.wrapping_add(1);
        if self.frames_processed % DENORMAL_FLUSH_INTERVAL == 0 {
            flush_denormals(&mut self.prev_phase);
            flush_denormals(&mut self.phase_accum);
            flush_denormals(&mut self.inst_advance);
        }
    }

    /// Windowed forward transform and instantaneous-frequency estimation.
    fn analyze(&mut self, frame: &[f32]) {
        for (buf, (&sample, &w)) in self
            .fft_buffer
            .iter_mut()
            .zip(frame.iter().zip(self.window.iter()))
        {
            *buf = Complex::new(sample * w, 0.0);
        }
        self.forward.process(&mut self.fft_buffer);

        let num_bins = self.magnitudes.len();
        for bin in 0..num_bins {
            let c = self.fft_buffer[bin];
            self.magnitudes[bin] = c.norm();
            let phase = c.arg();

            // Deviation of the observed per-hop phase delta from the bin
            // center, unwrapped to the principal range.
            let expected = self.center_advance[bin];
            let deviation = wrap_phase(phase - self.prev_phase[bin] - expected);
            self.inst_advance[bin] = expected + deviation;

            self.analysis_phases[bin] = phase;
            self.prev_phase[bin] = phase;
        }
    }

    /// Shifts spectral content to `bin * ratio` by inverse mapping with
    /// linear interpolation, scaling the per-bin advance by the ratio so the
    /// synthesis recurrence lands on the shifted frequency.
    fn remap_pitch(&mut self, ratio: f64) {
        let num_bins = self.magnitudes.len();
        self.shift_mags.iter_mut().for_each(|m| *m = 0.0);
        self.shift_advance.iter_mut().for_each(|a| *a = 0.0);
        self.shift_phases.iter_mut().for_each(|p| *p = 0.0);

        for target in 0..num_bins {
            let source = target as f64 / ratio;
            let src = source as usize;
            if src + 1 >= num_bins {
                continue;
            }
            let frac = (source - src as f64) as f32;
            self.shift_mags[target] = self.magnitudes[src]
                + (self.magnitudes[src + 1] - self.magnitudes[src]) * frac;
            let advance = self.inst_advance[src] as f64
                + (self.inst_advance[src + 1] - self.inst_advance[src]) as f64 * frac as f64;
            self.shift_advance[target] = (advance * ratio) as f32;
            self.shift_phases[target] = self.analysis_phases[src];
        }

        // Bin shifting loses energy to truncation and interpolation; scale
        // the result so total spectral energy matches the analysis frame.
        let input_energy: f32 = self.magnitudes.iter().map(|m| m * m).sum();
        let output_energy: f32 = self.shift_mags.iter().map(|m| m * m).sum();
        if output_energy > f32::EPSILON {
            let gain = (input_energy / output_energy).sqrt();
            for m in self.shift_mags.iter_mut() {
                *m *= gain;
            }
        }

        self.magnitudes.copy_from_slice(&self.shift_mags);
        self.inst_advance.copy_from_slice(&self.shift_advance);
        self.analysis_phases.copy_from_slice(&self.shift_phases);
    }

    /// Advances peak-bin synthesis phases and locks the rest to them.
    ///
    /// The pitch ratio is already folded into `inst_advance` by
    /// `remap_pitch`, so the accumulator step here scales by the synthesis
    /// hop alone.
    fn advance_and_lock(&mut self, settings: &FrameSettings) {
        let advance_scale =
            (settings.synthesis_hop as f64 / self.hop_analysis as f64) as f32;

        find_peaks(&self.magnitudes, &mut self.peaks);

        if self.peaks.is_empty() {
            // Flat or near-silent spectrum: fall back to standard per-bin
            // advancement so phase continuity survives quiet passages.
            for bin in 0..self.phase_accum.len() {
                self.phase_accum[bin] += self.inst_advance[bin] * advance_scale;
                self.synthesis_phases[bin] = self.phase_accum[bin];
            }
            return;
        }

        for &peak in &self.peaks {
            self.phase_accum[peak] += self.inst_advance[peak] * advance_scale;
            self.synthesis_phases[peak] = self.phase_accum[peak];
        }
        lock_to_peaks(&self.analysis_phases, &mut self.synthesis_phases, &self.peaks);

        // The accumulator follows the locked phases so the next frame's
        // advance starts from what was actually synthesized.
        self.phase_accum.copy_from_slice(&self.synthesis_phases);
    }

    /// Rebuilds the Hermitian spectrum, inverse-transforms, and windows.
    fn synthesize(&mut self, out: &mut [f32]) {
        let num_bins = self.magnitudes.len();
        for bin in 0..num_bins {
            self.fft_buffer[bin] =
                Complex::from_polar(self.magnitudes[bin], self.synthesis_phases[bin]);
        }
        for bin in 1..num_bins - 1 {
            self.fft_buffer[self.fft_size - bin] = self.fft_buffer[bin].conj();
        }

        self.inverse.process(&mut self.fft_buffer);

        for (i, o) in out.iter_mut().enumerate() {
            *o = self.fft_buffer[i].re * self.synthesis_gain * self.window[i];
        }
    }

    /// Stretches and pitch-shifts a whole mono buffer offline.
    ///
    /// Produces the fully time-stretched output with window-energy
    /// normalized overlap-add, the same per-frame pipeline the streaming
    /// engine runs.
    pub fn process(
        &mut self,
        input: &[f32],
        stretch_ratio: f64,
        pitch_ratio: f64,
    ) -> Result<Vec<f32>, EngineError> {
        if input.len() < self.fft_size {
            return Err(EngineError::InputTooShort {
                provided: input.len(),
                minimum: self.fft_size,
            });
        }
        if !stretch_ratio.is_finite() || !(0.25..=4.0).contains(&stretch_ratio) {
            return Err(EngineError::InvalidRatio(format!(
                "stretch ratio {} outside 0.25..=4.0",
                stretch_ratio
            )));
        }
        if !pitch_ratio.is_finite() || !(0.5..=2.0).contains(&pitch_ratio) {
            return Err(EngineError::InvalidRatio(format!(
                "pitch ratio {} outside 0.5..=2.0",
                pitch_ratio
            )));
        }

        self.reset();

        let synthesis_hop = ((self.hop_analysis as f64 * stretch_ratio).round() as usize).max(1);
        let settings = FrameSettings {
            synthesis_hop,
            pitch_ratio,
            ..FrameSettings::neutral(self.hop_analysis)
        };

        let num_frames = (input.len() - self.fft_size) / self.hop_analysis + 1;
        let output_len = (num_frames - 1) * synthesis_hop + self.fft_size;
        let mut output = vec![0.0f32; output_len];
        let mut window_sum = vec![0.0f32; output_len];
        let mut frame_out = vec![0.0f32; self.fft_size];

        for frame_idx in 0..num_frames {
            let analysis_pos = frame_idx * self.hop_analysis;
            let synthesis_pos = frame_idx * synthesis_hop;

            self.process_frame(
                &input[analysis_pos..analysis_pos + self.fft_size],
                &settings,
                &mut frame_out,
            );

            for i in 0..self.fft_size {
                output[synthesis_pos + i] += frame_out[i];
                window_sum[synthesis_pos + i] += self.window[i] * self.window[i];
            }
        }

        for (sample, &ws) in output.iter_mut().zip(window_sum.iter()) {
            if ws > NORM_EPSILON {
                *sample /= ws;
            } else {
                *sample = 0.0;
            }
        }

        Ok(output)
    }
}

/// Wraps a phase value to the principal range (-PI, PI].
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let p = phase + PI;
    p - (p / TWO_PI).floor() * TWO_PI - PI
}
