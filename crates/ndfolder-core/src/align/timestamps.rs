use std::ops::Range;

use ndarray::{s, Array3, Axis};
use tracing::{debug, info};

use crate::acquisition::AcquisitionSource;
use crate::consts::{MILLISECONDS_PER_DAY, SECONDS_PER_DAY};

use super::coords::{AxisPadding, CoordinateLayout};

/// Build the dense (time, position, z) timestamp tensor of one acquisition.
///
/// Every recorded frame writes its timestamp into the cells it addresses;
/// loops the file does not record are broadcast over the full axis. A
/// present z loop shorter than `z_len` lands on the same centered planes as
/// the pixel data. Cells no frame reaches stay 0 (unknown).
pub fn reconstruct_timestamps(
    source: &dyn AcquisitionSource,
    t_len: usize,
    position_len: usize,
    z_len: usize,
) -> Array3<f64> {
    let lengths = source.axis_lengths();
    let layout = CoordinateLayout::from_axis_lengths(&lengths);
    let z_padding = AxisPadding::centered(lengths.z_extent(), z_len);
    let mut times = Array3::<f64>::zeros((t_len, position_len, z_len));

    let mut skipped = 0usize;
    for seq in 0..source.frame_count() {
        let Some(slot) = layout.locate(seq) else {
            skipped += 1;
            continue;
        };
        let Some(timestamp) = source.frame_timestamp(seq) else {
            skipped += 1;
            continue;
        };

        let t_range = index_range(slot.t, t_len);
        let p_range = index_range(slot.position, position_len);
        let z_range = match slot.z {
            Some(z) => z_padding
                .canonical_index(z)
                .map(|i| i..i + 1)
                .unwrap_or(0..0),
            None => 0..z_len,
        };
        if t_range.is_empty() || p_range.is_empty() || z_range.is_empty() {
            skipped += 1;
            continue;
        }

        times
            .slice_mut(s![t_range, p_range, z_range])
            .fill(timestamp);
    }

    if skipped > 0 {
        debug!(
            file = source.name(),
            skipped,
            frames = source.frame_count(),
            "Frames without a usable timestamp slot"
        );
    }
    times
}

fn index_range(index: Option<usize>, len: usize) -> Range<usize> {
    match index {
        Some(i) if i < len => i..i + 1,
        Some(_) => 0..0,
        None => 0..len,
    }
}

/// Whether every timepoint carries exactly the same timestamps, at least one
/// of them known.
pub fn has_duplicate_timestamps(times: &Array3<f64>) -> bool {
    let n = times.len_of(Axis(0));
    if n < 2 || times.iter().all(|&v| v == 0.0) {
        return false;
    }
    let first = times.index_axis(Axis(0), 0);
    (1..n).all(|i| times.index_axis(Axis(0), i) == first)
}

/// Repair the burst defect where the device stamps every timepoint with the
/// same coarse time.
///
/// When all timepoints are identical, timepoint `i` is shifted by
/// `i * period`. Unknown (zero) cells stay unknown. Returns whether the
/// correction was applied.
pub fn correct_duplicate_timestamps(times: &mut Array3<f64>, period_ms: f64) -> bool {
    if !has_duplicate_timestamps(times) {
        return false;
    }

    let step_days = period_ms / MILLISECONDS_PER_DAY;
    for (i, mut timepoint) in times.axis_iter_mut(Axis(0)).enumerate() {
        let offset = i as f64 * step_days;
        timepoint.mapv_inplace(|v| if v == 0.0 { v } else { v + offset });
    }

    info!(
        timepoints = times.len_of(Axis(0)),
        period_s = step_days * SECONDS_PER_DAY,
        "Corrected duplicate timestamps"
    );
    true
}

/// Reorder the position axis: output position `i` takes input position
/// `permutation[i]`. Positions beyond the permutation stay 0.
pub fn permute_positions(times: &Array3<f64>, permutation: &[usize]) -> Array3<f64> {
    let (t_len, position_len, z_len) = times.dim();
    let mut permuted = Array3::<f64>::zeros((t_len, position_len, z_len));
    for (dst, &src) in permutation.iter().enumerate().take(position_len) {
        if src < position_len {
            permuted
                .index_axis_mut(Axis(1), dst)
                .assign(&times.index_axis(Axis(1), src));
        }
    }
    permuted
}
