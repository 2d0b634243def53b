use std::f32::consts::PI;

use spectralwarp::{AudioEngine, SpectralEngine};

pub fn gen_sine<F>(freq_hz: f32, sr: u32, n: usize, amp_fn: F) -> Vec<f32>
where
    F: Fn(usize) -> f32,
{
    (0..n)
        .map(|i| {
            let phase = 2.0 * PI * freq_hz * i as f32 / sr as f32;
            amp_fn(i) * phase.sin()
        })
        .collect()
}

/// A sine burst: `burst_len` samples of tone followed by silence to `n`.
pub fn gen_burst(freq_hz: f32, sr: u32, burst_len: usize, n: usize) -> Vec<f32> {
    let mut out = gen_sine(freq_hz, sr, n, |_| 1.0);
    for s in out.iter_mut().skip(burst_len) {
        *s = 0.0;
    }
    out
}

/// Deterministic broadband noise (no rand dependency in tests).
pub fn gen_noise(n: usize, amp: f32) -> Vec<f32> {
    let mut state = 0x12345678u32;
    (0..n)
        .map(|_| {
            // xorshift32
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            amp * ((state as f32 / u32::MAX as f32) * 2.0 - 1.0)
        })
        .collect()
}

pub fn windowed_rms(signal: &[f32], start: usize, len: usize) -> f64 {
    if signal.is_empty() || len == 0 {
        return 0.0;
    }
    let start = start.min(signal.len());
    let end = (start + len).min(signal.len());
    if end <= start {
        return 0.0;
    }
    let sum_sq: f64 = signal[start..end]
        .iter()
        .map(|&s| {
            let v = s as f64;
            v * v
        })
        .sum();
    (sum_sq / (end - start) as f64).sqrt()
}

pub fn rms(signal: &[f32]) -> f64 {
    windowed_rms(signal, 0, signal.len())
}

pub fn db(linear: f64) -> f64 {
    20.0 * linear.max(1e-12).log10()
}

pub fn count_positive_zero_crossings(signal: &[f32], start: usize, end: usize) -> usize {
    if signal.len() < 2 {
        return 0;
    }
    let start = start.min(signal.len() - 1);
    let end = end.min(signal.len());
    if end <= start + 1 {
        return 0;
    }
    let mut count = 0usize;
    for i in start..(end - 1) {
        if signal[i] <= 0.0 && signal[i + 1] > 0.0 {
            count += 1;
        }
    }
    count
}

pub fn estimate_freq_zero_crossings(signal: &[f32], sr: u32, start: usize, end: usize) -> f64 {
    if end <= start + 1 {
        return 0.0;
    }
    let crossings = count_positive_zero_crossings(signal, start, end) as f64;
    let duration_secs = (end - start) as f64 / sr as f64;
    if duration_secs <= 0.0 {
        0.0
    } else {
        crossings / duration_secs
    }
}

pub fn energy_at_freq(signal: &[f32], sr: u32, freq_hz: f32) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    let mut re = 0.0f64;
    let mut im = 0.0f64;
    for (i, &s) in signal.iter().enumerate() {
        let angle = 2.0 * std::f64::consts::PI * freq_hz as f64 * i as f64 / sr as f64;
        let sv = s as f64;
        re += sv * angle.cos();
        im -= sv * angle.sin();
    }
    (re * re + im * im).sqrt() / signal.len() as f64
}

/// Spectral centroid in Hz over a signal segment, via a plain DFT sweep.
pub fn spectral_centroid(signal: &[f32], sr: u32) -> f64 {
    let mut weighted = 0.0f64;
    let mut total = 0.0f64;
    let mut freq = 50.0f32;
    while (freq as f64) < sr as f64 / 2.0 {
        let e = energy_at_freq(signal, sr, freq);
        weighted += freq as f64 * e;
        total += e;
        freq += 50.0;
    }
    if total > 0.0 {
        weighted / total
    } else {
        0.0
    }
}

/// Largest absolute sample-to-sample step in a segment.
pub fn max_discontinuity(signal: &[f32], start: usize, end: usize) -> f32 {
    let end = end.min(signal.len());
    if end <= start + 1 {
        return 0.0;
    }
    signal[start..end]
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(0.0f32, f32::max)
}

/// Runs a prepared engine over mono input in fixed-size blocks, applying
/// `control` before each block (block index, engine).
pub fn run_engine_mono_with<F>(
    engine: &mut SpectralEngine,
    input: &[f32],
    block: usize,
    mut control: F,
) -> Vec<f32>
where
    F: FnMut(usize, &mut SpectralEngine),
{
    let mut output = Vec::with_capacity(input.len());
    for (idx, chunk) in input.chunks(block.max(1)).enumerate() {
        control(idx, engine);
        let mut buf = chunk.to_vec();
        {
            let mut channels: Vec<&mut [f32]> = vec![&mut buf];
            engine.process(&mut channels);
        }
        output.extend_from_slice(&buf);
    }
    output
}

pub fn run_engine_mono(engine: &mut SpectralEngine, input: &[f32], block: usize) -> Vec<f32> {
    run_engine_mono_with(engine, input, block, |_, _| {})
}
