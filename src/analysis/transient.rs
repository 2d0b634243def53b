//! Per-sample transient envelope follower.
//!
//! A fast-attack/slow-release one-pole tracker on input amplitude. The
//! follower is required infrastructure for the spectral engine: it must run
//! every call without fault, but its output is an extension point and feeds
//! nothing in the spectral path yet.

/// One-pole |x| follower with independent attack and release coefficients.
#[derive(Debug, Clone)]
pub struct TransientFollower {
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

/// One-pole coefficient for a time constant in milliseconds.
#[inline]
fn time_constant_coeff(ms: f32, sample_rate: f32) -> f32 {
    let samples = (ms * 0.001 * sample_rate).max(1.0);
    (-1.0 / samples).exp()
}

impl TransientFollower {
    /// Creates a follower with the given time constants.
    ///
    /// Attack is clamped to 0.1–10 ms, release to 10–500 ms.
    pub fn new(attack_ms: f32, release_ms: f32, sample_rate: f32) -> Self {
        let mut follower = Self {
            attack_coeff: 0.0,
            release_coeff: 0.0,
            envelope: 0.0,
        };
        follower.set_times(attack_ms, release_ms, sample_rate);
        follower
    }

    /// Recomputes coefficients for new time constants.
    pub fn set_times(&mut self, attack_ms: f32, release_ms: f32, sample_rate: f32) {
        let attack_ms = attack_ms.clamp(0.1, 10.0);
        let release_ms = release_ms.clamp(10.0, 500.0);
        let sample_rate = sample_rate.max(1.0);
        self.attack_coeff = time_constant_coeff(attack_ms, sample_rate);
        self.release_coeff = time_constant_coeff(release_ms, sample_rate);
    }

    /// Advances the follower over a block of samples.
    pub fn process(&mut self, input: &[f32]) {
        for &x in input {
            let rectified = x.abs();
            let coeff = if rectified > self.envelope {
                self.attack_coeff
            } else {
                self.release_coeff
            };
            self.envelope = rectified + coeff * (self.envelope - rectified);
        }
        if !self.envelope.is_finite() {
            self.envelope = 0.0;
        }
    }

    /// Current envelope value.
    #[inline]
    pub fn envelope(&self) -> f32 {
        self.envelope
    }

    /// Clears the follower state.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }
}
