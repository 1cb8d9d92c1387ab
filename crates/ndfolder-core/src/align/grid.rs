use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acquisition::StagePosition;
use crate::consts::{
    DEFAULT_LANE_TOLERANCE_DIVISOR, DEFAULT_MAX_LANES, DEFAULT_MAX_LANE_SPACING,
    DEFAULT_MIN_LANE_SPACING,
};
use crate::error::{FolderError, Result};

/// Chip geometry used to cluster stage positions into lanes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// x distances above this count as neighbouring lanes.
    #[serde(default = "default_min_lane_spacing")]
    pub min_lane_spacing: f64,
    /// x distances below this count as neighbouring lanes.
    #[serde(default = "default_max_lane_spacing")]
    pub max_lane_spacing: f64,
    /// Number of lane centres scanned.
    #[serde(default = "default_max_lanes")]
    pub max_lanes: usize,
    /// Lane half-width is `pitch / lane_tolerance_divisor`.
    #[serde(default = "default_lane_tolerance_divisor")]
    pub lane_tolerance_divisor: f64,
}

fn default_min_lane_spacing() -> f64 {
    DEFAULT_MIN_LANE_SPACING
}
fn default_max_lane_spacing() -> f64 {
    DEFAULT_MAX_LANE_SPACING
}
fn default_max_lanes() -> usize {
    DEFAULT_MAX_LANES
}
fn default_lane_tolerance_divisor() -> f64 {
    DEFAULT_LANE_TOLERANCE_DIVISOR
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_lane_spacing: DEFAULT_MIN_LANE_SPACING,
            max_lane_spacing: DEFAULT_MAX_LANE_SPACING,
            max_lanes: DEFAULT_MAX_LANES,
            lane_tolerance_divisor: DEFAULT_LANE_TOLERANCE_DIVISOR,
        }
    }
}

/// Lane-major ordering of the positions of one acquisition.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    /// Raw position index for each output slot.
    pub permutation: Vec<usize>,
    /// Label of each output slot, e.g. `lane2-3`.
    pub labels: Vec<String>,
}

impl GridLayout {
    /// Keep acquisition order of `count` positions, labelled from `labels`
    /// and `position{n}` past its end.
    pub fn with_labels(count: usize, labels: &[String]) -> Self {
        Self {
            permutation: (0..count).collect(),
            labels: (0..count)
                .map(|i| {
                    labels
                        .get(i)
                        .cloned()
                        .unwrap_or_else(|| format!("position{}", i + 1))
                })
                .collect(),
        }
    }

    /// Keep acquisition order with generic `position{n}` labels.
    pub fn identity(count: usize) -> Self {
        Self::with_labels(count, &[])
    }

    /// Label of the position stored at raw acquisition index `raw`.
    pub fn label_of_raw(&self, raw: usize) -> Option<&str> {
        self.permutation
            .iter()
            .position(|&p| p == raw)
            .map(|slot| self.labels[slot].as_str())
    }
}

/// Group stage positions into lanes of similar x and order them lane by
/// lane, rows sorted by y.
///
/// The lane pitch is the mean of all pairwise x distances inside the
/// configured spacing window. Lane `k` is centred at `min_x + k * pitch`.
/// Inverting an axis negates its coordinates before clustering and sorting.
pub fn resolve_grid(
    positions: &[StagePosition],
    invert_x: bool,
    invert_y: bool,
    config: &GridConfig,
) -> Result<GridLayout> {
    if positions.len() <= 1 {
        return Ok(GridLayout {
            permutation: (0..positions.len()).collect(),
            labels: (0..positions.len()).map(|_| "lane1-1".to_string()).collect(),
        });
    }

    let sign = |invert: bool| -> f64 { if invert { -1.0 } else { 1.0 } };
    let xs: Vec<f64> = positions.iter().map(|p| p.x * sign(invert_x)).collect();
    let ys: Vec<f64> = positions.iter().map(|p| p.y * sign(invert_y)).collect();

    let mut spacings = Vec::new();
    for i in 0..xs.len() {
        for j in i + 1..xs.len() {
            let d = (xs[i] - xs[j]).abs();
            if d > config.min_lane_spacing && d < config.max_lane_spacing {
                spacings.push(d);
            }
        }
    }
    if spacings.is_empty() {
        return Err(FolderError::GridResolution(format!(
            "no x spacing between {} and {} among {} positions",
            config.min_lane_spacing,
            config.max_lane_spacing,
            positions.len()
        )));
    }
    let pitch = spacings.iter().sum::<f64>() / spacings.len() as f64;
    let tolerance = pitch / config.lane_tolerance_divisor;
    let min_x = xs.iter().copied().fold(f64::INFINITY, f64::min);

    let mut assigned = vec![false; positions.len()];
    let mut permutation = Vec::with_capacity(positions.len());
    let mut labels = Vec::with_capacity(positions.len());

    for lane in 0..config.max_lanes {
        let centre = min_x + lane as f64 * pitch;
        let mut members: Vec<usize> = (0..xs.len())
            .filter(|&i| !assigned[i] && (xs[i] - centre).abs() < tolerance)
            .collect();
        members.sort_by(|&a, &b| ys[a].total_cmp(&ys[b]));

        for (row, &i) in members.iter().enumerate() {
            assigned[i] = true;
            permutation.push(i);
            labels.push(format!("lane{}-{}", lane + 1, row + 1));
        }
    }

    let unassigned = assigned.iter().filter(|a| !**a).count();
    if unassigned > 0 {
        return Err(FolderError::GridResolution(format!(
            "{unassigned} of {} positions fall outside {} lanes of pitch {pitch:.1}",
            positions.len(),
            config.max_lanes
        )));
    }

    debug!(pitch, positions = positions.len(), "Stage grid resolved");
    Ok(GridLayout {
        permutation,
        labels,
    })
}
