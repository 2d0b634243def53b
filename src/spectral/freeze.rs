//! Spectrum freeze: snapshot capture, frozen playback, crossfaded release.
//!
//! State machine: `Live -> Capturing -> Frozen -> Releasing -> Live`.
//! Enabling freeze snapshots the next analyzed frame and substitutes it for
//! live analysis until freeze is released; release blends frozen and live
//! spectra for one synthesis hop before returning to live. Re-enabling
//! while releasing restarts capture immediately, so the machine always
//! resolves to `Live` or `Frozen` within one hop.

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::PI;

/// Freeze subsystem states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeState {
    /// Passing live analysis through.
    Live,
    /// Freeze requested; the next frame is captured.
    Capturing,
    /// Playing the captured snapshot.
    Frozen,
    /// Crossfading back to live over one synthesis hop.
    Releasing,
}

/// Owns the frozen snapshot and drives the state machine.
#[derive(Debug, Clone)]
pub struct FreezeUnit {
    state: FreezeState,
    snapshot_mags: Vec<f32>,
    snapshot_phases: Vec<f32>,
    rng: StdRng,
}

impl FreezeUnit {
    /// Creates an idle freeze unit for the given bin count.
    pub fn new(num_bins: usize) -> Self {
        Self {
            state: FreezeState::Live,
            snapshot_mags: vec![0.0; num_bins],
            snapshot_phases: vec![0.0; num_bins],
            // Deterministic seed: repeatable output for the same input.
            rng: StdRng::seed_from_u64(0x5EED),
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> FreezeState {
        self.state
    }

    /// Applies a freeze on/off request. Toggles faster than one hop resolve
    /// as last-request-wins.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.state = match (self.state, enabled) {
            (FreezeState::Live, true) => FreezeState::Capturing,
            (FreezeState::Releasing, true) => FreezeState::Capturing,
            (FreezeState::Capturing, false) => FreezeState::Live,
            (FreezeState::Frozen, false) => FreezeState::Releasing,
            (state, _) => state,
        };
    }

    /// Runs the freeze stage on one analyzed frame, in place.
    ///
    /// `instantaneous_freqs` holds the per-bin advance frequencies; while
    /// frozen they are pinned to the bin centers so the snapshot sustains
    /// instead of drifting. `phase_reset` scales the per-frame phase
    /// randomization that keeps long holds from turning static.
    pub fn apply(
        &mut self,
        magnitudes: &mut [f32],
        phases: &mut [f32],
        instantaneous_freqs: &mut [f32],
        center_freqs: &[f32],
        phase_reset: f32,
    ) {
        match self.state {
            FreezeState::Live => {}
            FreezeState::Capturing => {
                // Single-frame capture: this frame's live spectrum becomes
                // the snapshot and playback starts immediately.
                self.snapshot_mags.copy_from_slice(magnitudes);
                self.snapshot_phases.copy_from_slice(phases);
                self.state = FreezeState::Frozen;
            }
            FreezeState::Frozen => {
                magnitudes.copy_from_slice(&self.snapshot_mags);
                phases.copy_from_slice(&self.snapshot_phases);
                instantaneous_freqs.copy_from_slice(center_freqs);
                if phase_reset > 0.0 {
                    for phase in phases.iter_mut() {
                        *phase += self.rng.gen_range(-PI..PI) * phase_reset;
                    }
                }
            }
            FreezeState::Releasing => {
                // Linear crossfade at the midpoint; the 4x overlap-add
                // spreads the transition across a full window.
                for (mag, &frozen) in magnitudes.iter_mut().zip(self.snapshot_mags.iter()) {
                    *mag = 0.5 * (*mag + frozen);
                }
                self.state = FreezeState::Live;
            }
        }
    }

    /// Drops any snapshot and returns to `Live`.
    pub fn reset(&mut self) {
        self.state = FreezeState::Live;
        self.snapshot_mags.iter_mut().for_each(|m| *m = 0.0);
        self.snapshot_phases.iter_mut().for_each(|p| *p = 0.0);
    }
}
