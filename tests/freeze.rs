//! Spectral freeze behavior under streaming control changes.

mod common;

use common::*;
use spectralwarp::{AudioEngine, ParamId, SpectralEngine, FFT_SIZE};

const SR: u32 = 48000;
const BLOCK: usize = 512;

fn prepared_engine() -> SpectralEngine {
    let mut engine = SpectralEngine::new();
    engine.prepare(SR as f64, BLOCK);
    engine
}

#[test]
fn freeze_engages_without_discontinuity() {
    let mut engine = prepared_engine();
    let n = FFT_SIZE * 16;
    let input = gen_sine(1000.0, SR, n, |_| 0.5);
    let toggle_block = n / BLOCK / 2;

    let output = run_engine_mono_with(&mut engine, &input, BLOCK, |idx, engine| {
        if idx == toggle_block {
            engine.set_parameter(ParamId::Freeze as usize, 1.0);
        }
    });

    // Inspect a window spanning the transition. Overlap-add cross-fades the
    // captured frame in, so no sample-to-sample step should exceed what a
    // 1 kHz tone at this amplitude can produce plus modest headroom.
    let center = toggle_block * BLOCK;
    let step = max_discontinuity(&output, center - FFT_SIZE, center + FFT_SIZE * 3);
    assert!(step < 0.35, "freeze transition step {:.3} too large", step);
}

#[test]
fn frozen_output_sustains_over_silent_input() {
    let mut engine = prepared_engine();
    let tone_len = SR as usize;
    let total = SR as usize * 2;
    let mut input = gen_sine(1000.0, SR, total, |_| 0.5);
    for s in input.iter_mut().skip(tone_len) {
        *s = 0.0;
    }
    // Freeze just before the tone ends so the snapshot holds the tone.
    let toggle_block = (tone_len - FFT_SIZE) / BLOCK;

    let output = run_engine_mono_with(&mut engine, &input, BLOCK, |idx, engine| {
        if idx == toggle_block {
            engine.set_parameter(ParamId::Freeze as usize, 1.0);
        }
    });

    // Well into the silent region the engine still emits the captured frame.
    let tail = windowed_rms(&output, total - SR as usize / 2, SR as usize / 2);
    assert!(
        tail > 0.05,
        "frozen tail faded to {:.4} rms over silence",
        tail
    );
}

#[test]
fn release_returns_to_live_input() {
    let mut engine = prepared_engine();
    let tone_len = SR as usize;
    let total = SR as usize * 3;
    let mut input = gen_sine(1000.0, SR, total, |_| 0.5);
    for s in input.iter_mut().skip(tone_len) {
        *s = 0.0;
    }
    let freeze_block = (tone_len - FFT_SIZE) / BLOCK;
    let unfreeze_block = (SR as usize * 2) / BLOCK;

    let output = run_engine_mono_with(&mut engine, &input, BLOCK, |idx, engine| {
        if idx == freeze_block {
            engine.set_parameter(ParamId::Freeze as usize, 1.0);
        } else if idx == unfreeze_block {
            engine.set_parameter(ParamId::Freeze as usize, 0.0);
        }
    });

    // Frozen segment sustains, then once released over silent input the
    // output decays back toward silence after the pipeline drains.
    let frozen = windowed_rms(&output, SR as usize * 3 / 2, SR as usize / 4);
    assert!(frozen > 0.05, "frozen segment rms {:.4}", frozen);

    let drain = unfreeze_block * BLOCK + FFT_SIZE * 6;
    let tail = windowed_rms(&output, drain, total.saturating_sub(drain));
    assert!(
        tail < 0.01,
        "released output did not return to silence: {:.4} rms",
        tail
    );
}

#[test]
fn rapid_toggles_settle_on_last_state() {
    let mut engine = prepared_engine();
    let tone_len = SR as usize;
    let total = SR as usize * 2;
    let mut input = gen_sine(700.0, SR, total, |_| 0.5);
    for s in input.iter_mut().skip(tone_len) {
        *s = 0.0;
    }
    let base = (tone_len - FFT_SIZE * 2) / BLOCK;

    // Flip the toggle every block for a few blocks, ending enabled.
    let output = run_engine_mono_with(&mut engine, &input, BLOCK, |idx, engine| {
        if idx >= base && idx < base + 5 {
            let on = (idx - base) % 2 == 0;
            engine.set_parameter(ParamId::Freeze as usize, if on { 1.0 } else { 0.0 });
        } else if idx == base + 5 {
            engine.set_parameter(ParamId::Freeze as usize, 1.0);
        }
    });

    let tail = windowed_rms(&output, total - SR as usize / 4, SR as usize / 4);
    assert!(
        tail > 0.05,
        "last-wins freeze should sustain the tone, got {:.4} rms",
        tail
    );
    assert!(output.iter().all(|s| s.is_finite()));
}

#[test]
fn phase_reset_keeps_output_bounded() {
    // Full phase randomization while frozen scrambles the snapshot phases
    // but the output must stay finite and in a sane range.
    let mut engine = prepared_engine();
    engine.set_parameter(ParamId::PhaseReset as usize, 1.0);
    let total = SR as usize * 2;
    let input = gen_sine(1000.0, SR, total, |_| 0.5);
    let toggle_block = total / BLOCK / 2;

    let output = run_engine_mono_with(&mut engine, &input, BLOCK, |idx, engine| {
        if idx == toggle_block {
            engine.set_parameter(ParamId::Freeze as usize, 1.0);
        }
    });

    assert!(output.iter().all(|s| s.is_finite()));
    let peak = output.iter().fold(0.0f32, |a, &s| a.max(s.abs()));
    assert!(peak < 4.0, "randomized freeze peaked at {:.2}", peak);
    let tail = windowed_rms(&output, total - SR as usize / 4, SR as usize / 4);
    assert!(tail > 0.01, "randomized freeze went silent: {:.4}", tail);
}
