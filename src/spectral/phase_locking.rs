//! Identity phase locking (Laroche & Dolson 1999).
//!
//! Bins are partitioned into regions owned by their nearest spectral peak.
//! Only peak bins carry an independently advanced synthesis phase; every
//! other bin is re-phased to its peak's advanced phase plus the bin's
//! analysis-time offset from that peak. This preserves intra-lobe phase
//! relationships and noticeably reduces "phasiness" and transient smearing
//! compared with naive per-bin advancement.

/// Scans the magnitude spectrum for strict local maxima.
///
/// The result is written into `peaks`, which is reused across frames to
/// avoid hot-path allocation.
pub fn find_peaks(magnitudes: &[f32], peaks: &mut Vec<usize>) {
    peaks.clear();
    if magnitudes.len() < 3 {
        return;
    }
    for bin in 1..magnitudes.len() - 1 {
        if magnitudes[bin] > magnitudes[bin - 1] && magnitudes[bin] > magnitudes[bin + 1] {
            peaks.push(bin);
        }
    }
}

/// Locks every non-peak bin's synthesis phase to its nearest peak.
///
/// `synthesis_phases` must already contain the advanced phase for each peak
/// bin. When no peaks exist (flat or near-silent spectra) the phases are
/// left untouched.
pub fn lock_to_peaks(
    analysis_phases: &[f32],
    synthesis_phases: &mut [f32],
    peaks: &[usize],
) {
    if peaks.is_empty() {
        return;
    }

    let mut peak_idx = 0;
    for bin in 0..synthesis_phases.len() {
        // Walk forward to the peak nearest this bin; regions are contiguous
        // so the cursor never moves backwards.
        while peak_idx + 1 < peaks.len()
            && (peaks[peak_idx + 1] as i64 - bin as i64).unsigned_abs()
                < (peaks[peak_idx] as i64 - bin as i64).unsigned_abs()
        {
            peak_idx += 1;
        }

        let nearest = peaks[peak_idx];
        if bin != nearest {
            let analysis_offset = analysis_phases[bin] - analysis_phases[nearest];
            synthesis_phases[bin] = synthesis_phases[nearest] + analysis_offset;
        }
    }
}
