//! Normalized engine parameters and their documented mappings.
//!
//! All ten parameters arrive as normalized values in [0, 1]. Values are
//! clamped (NaN falls back to the parameter default) when set, and the
//! engine snapshots the whole block once per hop boundary so a frame never
//! sees a half-applied update.

/// Number of engine parameters.
pub const NUM_PARAMS: usize = 10;

/// Parameter indices shared with the surrounding host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum ParamId {
    /// Time-stretch ratio, 0.25x-4x with a snap-to-unity deadband.
    Stretch = 0,
    /// Pitch ratio, +/-24 semitones mapped, clamped to 0.5x-2x.
    Pitch = 1,
    /// Spectral smear width, 0-10 bins.
    Smear = 2,
    /// Reserved transient-preservation amount (detector-only).
    Transient = 3,
    /// Phase randomization amount, active only while frozen.
    PhaseReset = 4,
    /// Spectral gate threshold (squared-normalized).
    Gate = 5,
    /// Dry/wet mix.
    Mix = 6,
    /// Freeze toggle (true above 0.5).
    Freeze = 7,
    /// Transient follower attack, 0.1-10 ms.
    Attack = 8,
    /// Transient follower release, 10-500 ms.
    Release = 9,
}

/// Deadband half-width around the neutral stretch position.
const STRETCH_DEADBAND: f32 = 0.025;

/// Mix values below this bypass the spectral path entirely.
pub const MIX_BYPASS_EPSILON: f32 = 1e-4;

/// Normalized parameter block with mapped accessors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineParams {
    raw: [f32; NUM_PARAMS],
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            raw: Self::DEFAULTS,
        }
    }
}

impl EngineParams {
    /// Neutral settings: unity stretch and pitch, modifiers off, fully wet,
    /// freeze off, 1 ms attack / ~71 ms release.
    const DEFAULTS: [f32; NUM_PARAMS] = [0.5, 0.5, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.5, 0.5];

    /// Sets one normalized parameter.
    ///
    /// Values are clamped to [0, 1]; NaN is replaced with the parameter
    /// default; out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: f32) {
        if index >= NUM_PARAMS {
            return;
        }
        self.raw[index] = if value.is_nan() {
            Self::DEFAULTS[index]
        } else {
            value.clamp(0.0, 1.0)
        };
    }

    /// Stretch ratio in 0.25x-4x, exponential, with a deadband snapping the
    /// neutral region to exactly 1.0.
    pub fn stretch_ratio(&self) -> f64 {
        let v = self.raw[ParamId::Stretch as usize];
        if (v - 0.5).abs() < STRETCH_DEADBAND {
            return 1.0;
        }
        0.25 * 2f64.powf(4.0 * v as f64)
    }

    /// Pitch ratio: +/-24 semitones mapped exponentially, then clamped to
    /// the supported 0.5x-2x range.
    pub fn pitch_ratio(&self) -> f64 {
        let v = self.raw[ParamId::Pitch as usize];
        let semitones = (v as f64 - 0.5) * 48.0;
        2f64.powf(semitones / 12.0).clamp(0.5, 2.0)
    }

    /// Smear half-width in bins (0 disables).
    pub fn smear_bins(&self) -> usize {
        (self.raw[ParamId::Smear as usize] * 10.0).round() as usize
    }

    /// Phase randomization amount while frozen.
    pub fn phase_reset(&self) -> f32 {
        self.raw[ParamId::PhaseReset as usize]
    }

    /// Gate threshold, squared-normalized (0 disables).
    pub fn gate_threshold(&self) -> f32 {
        let v = self.raw[ParamId::Gate as usize];
        v * v
    }

    /// Dry/wet mix.
    pub fn mix(&self) -> f32 {
        self.raw[ParamId::Mix as usize]
    }

    /// True when the mix is effectively dry and the spectral path can be
    /// bypassed.
    pub fn is_bypassed(&self) -> bool {
        self.mix() < MIX_BYPASS_EPSILON
    }

    /// Freeze toggle.
    pub fn freeze_enabled(&self) -> bool {
        self.raw[ParamId::Freeze as usize] > 0.5
    }

    /// Attack time constant in 0.1-10 ms, exponential.
    pub fn attack_ms(&self) -> f32 {
        0.1 * 100f32.powf(self.raw[ParamId::Attack as usize])
    }

    /// Release time constant in 10-500 ms, exponential.
    pub fn release_ms(&self) -> f32 {
        10.0 * 50f32.powf(self.raw[ParamId::Release as usize])
    }
}
