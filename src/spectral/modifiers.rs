//! Spectral magnitude modifiers: smear and gate.
//!
//! Both operate after phase locking and before spectrum reconstruction,
//! and touch magnitudes only; locked phases pass through unchanged.

/// Replaces each magnitude with the mean of a symmetric window of
/// `2 * width + 1` neighboring bins. Width 0 is a no-op.
///
/// `scratch` is a caller-owned buffer of at least `magnitudes.len()`
/// entries, reused across frames so the hot path never allocates.
pub fn smear_magnitudes(magnitudes: &mut [f32], width: usize, scratch: &mut [f32]) {
    if width == 0 || magnitudes.is_empty() {
        return;
    }
    let n = magnitudes.len();
    scratch[..n].copy_from_slice(magnitudes);

    for bin in 0..n {
        let lo = bin.saturating_sub(width);
        let hi = (bin + width).min(n - 1);
        let sum: f32 = scratch[lo..=hi].iter().sum();
        magnitudes[bin] = sum / (hi - lo + 1) as f32;
    }
}

/// Zeroes any bin whose squared magnitude falls below `threshold` times the
/// frame's reference energy (the total squared magnitude across all bins).
/// Threshold 0 disables gating; at maximum threshold every bin of any
/// non-degenerate spectrum falls below the floor and the frame is silenced.
pub fn gate_magnitudes(magnitudes: &mut [f32], threshold: f32) {
    if threshold <= 0.0 || magnitudes.is_empty() {
        return;
    }
    let reference: f32 = magnitudes.iter().map(|m| m * m).sum();
    if reference <= 0.0 {
        return;
    }
    let floor = threshold * reference;
    for mag in magnitudes.iter_mut() {
        if *mag * *mag < floor {
            *mag = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smear_zero_width_is_noop() {
        let mut mags = vec![1.0, 0.0, 2.0, 0.0];
        let mut scratch = vec![0.0; 4];
        let original = mags.clone();
        smear_magnitudes(&mut mags, 0, &mut scratch);
        assert_eq!(mags, original);
    }

    #[test]
    fn smear_averages_neighbors() {
        let mut mags = vec![0.0, 3.0, 0.0, 0.0, 0.0];
        let mut scratch = vec![0.0; 5];
        smear_magnitudes(&mut mags, 1, &mut scratch);
        // Edge bin averages over 2 entries, interior over 3.
        assert!((mags[0] - 1.5).abs() < 1e-6);
        assert!((mags[1] - 1.0).abs() < 1e-6);
        assert!((mags[2] - 1.0).abs() < 1e-6);
        assert_eq!(mags[3], 0.0);
    }

    #[test]
    fn smear_preserves_total_interior_energy_shape() {
        let mut mags = vec![1.0; 8];
        let mut scratch = vec![0.0; 8];
        smear_magnitudes(&mut mags, 3, &mut scratch);
        // Averaging a constant spectrum changes nothing.
        for &m in &mags {
            assert!((m - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn gate_zero_threshold_disabled() {
        let mut mags = vec![1e-9, 1.0];
        gate_magnitudes(&mut mags, 0.0);
        assert_eq!(mags, vec![1e-9, 1.0]);
    }

    #[test]
    fn gate_removes_weak_bins_only() {
        let mut mags = vec![1.0, 0.05, 0.5, 0.001];
        // Reference energy = 1 + 0.0025 + 0.25 + 1e-6 ~= 1.2525.
        gate_magnitudes(&mut mags, 0.01); // floor ~= 0.0125 on mag^2
        assert_eq!(mags[0], 1.0);
        assert_eq!(mags[1], 0.0); // 0.0025 < floor
        assert_eq!(mags[2], 0.5); // 0.25 >= floor
        assert_eq!(mags[3], 0.0);
    }

    #[test]
    fn gate_at_maximum_silences_broadband_content() {
        // With the reference being total energy, no bin of a spread-out
        // spectrum reaches the full-threshold floor.
        let mut mags: Vec<f32> = (1..64).map(|i| 1.0 / i as f32).collect();
        gate_magnitudes(&mut mags, 1.0);
        assert!(mags.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn gate_is_monotonic_in_threshold() {
        let base: Vec<f32> = (0..64).map(|i| ((i * 37) % 64) as f32 / 64.0).collect();
        let mut prev_energy = f32::INFINITY;
        for step in 0..10 {
            let mut mags = base.clone();
            gate_magnitudes(&mut mags, step as f32 / 10.0);
            let energy: f32 = mags.iter().map(|m| m * m).sum();
            assert!(energy <= prev_energy + 1e-6);
            prev_energy = energy;
        }
    }

    #[test]
    fn gate_on_silence_is_noop() {
        let mut mags = vec![0.0; 16];
        gate_magnitudes(&mut mags, 1.0);
        assert!(mags.iter().all(|&m| m == 0.0));
    }
}
