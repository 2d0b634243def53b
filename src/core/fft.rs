//! FFT constants and round-trip scale calibration shared across the crate.

use rustfft::{num_complex::Complex, FftPlanner};

/// Zero-valued complex number, used for FFT buffer initialization.
pub const COMPLEX_ZERO: Complex<f32> = Complex::new(0.0, 0.0);

/// Absolute floor for overlap-add normalization divisors. Entries below
/// this force the output sample to zero instead of dividing.
pub const NORM_EPSILON: f32 = 1e-6;

/// Measures the forward+inverse round-trip scale of a transform pair by
/// pushing a unit impulse through both, and returns the gain that folds the
/// residual scale back to unity.
///
/// Runs once at prepare time so the scale is never applied twice. A
/// degenerate measurement (zero, subnormal, or non-finite peak) falls back
/// to unit gain rather than failing.
pub fn round_trip_gain(planner: &mut FftPlanner<f32>, size: usize) -> f32 {
    if size == 0 {
        return 1.0;
    }
    let forward = planner.plan_fft_forward(size);
    let inverse = planner.plan_fft_inverse(size);

    let mut buf = vec![COMPLEX_ZERO; size];
    buf[0] = Complex::new(1.0, 0.0);
    forward.process(&mut buf);
    inverse.process(&mut buf);

    let peak = buf.iter().map(|c| c.re.abs()).fold(0.0f32, f32::max);
    if peak.is_finite() && peak > NORM_EPSILON {
        1.0 / peak
    } else {
        1.0
    }
}
