//! Numerical safety helpers: denormal flushing and NaN/Inf scrubbing.

/// Magnitudes below this are treated as denormal and flushed to zero.
/// Sits well above the f32 subnormal boundary (~1.2e-38) so values decaying
/// toward it never reach the subnormal range at all.
pub const DENORMAL_THRESHOLD: f32 = 1e-30;

/// Flushes subnormal-range values in persistent state to zero.
#[inline]
pub fn flush_denormals(state: &mut [f32]) {
    for v in state.iter_mut() {
        if v.abs() < DENORMAL_THRESHOLD {
            *v = 0.0;
        }
    }
}

/// Replaces any NaN or infinite sample with zero.
///
/// Runs at the final output boundary; upstream numerical edge cases degrade
/// to silence rather than propagate.
#[inline]
pub fn scrub_non_finite(block: &mut [f32]) {
    for v in block.iter_mut() {
        if !v.is_finite() {
            *v = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flushes_tiny_values() {
        let mut state = [1.0, 1e-35, -1e-38, 0.5];
        flush_denormals(&mut state);
        assert_eq!(state, [1.0, 0.0, 0.0, 0.5]);
    }

    #[test]
    fn scrubs_nan_and_inf() {
        let mut block = [0.25, f32::NAN, f32::INFINITY, f32::NEG_INFINITY, -0.5];
        scrub_non_finite(&mut block);
        assert_eq!(block, [0.25, 0.0, 0.0, 0.0, -0.5]);
    }

    #[test]
    fn normal_audio_untouched() {
        let mut block = [0.1, -0.9, 1.0, -1.0];
        let copy = block;
        flush_denormals(&mut block);
        scrub_non_finite(&mut block);
        assert_eq!(block, copy);
    }
}
