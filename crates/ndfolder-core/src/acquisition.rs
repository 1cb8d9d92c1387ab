use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Loop extents recorded by one acquisition.
///
/// A value of 0 means the loop is absent: the source omits loops that were
/// not used or had a single iteration, so callers must not rely on the
/// rank of the pixel data to recover them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisLengths {
    #[serde(default)]
    pub time: usize,
    #[serde(default)]
    pub position: usize,
    #[serde(default)]
    pub z: usize,
}

impl AxisLengths {
    pub fn new(time: usize, position: usize, z: usize) -> Self {
        Self { time, position, z }
    }

    /// Number of timepoints, treating an absent loop as one.
    pub fn time_extent(&self) -> usize {
        self.time.max(1)
    }

    pub fn position_extent(&self) -> usize {
        self.position.max(1)
    }

    pub fn z_extent(&self) -> usize {
        self.z.max(1)
    }

    /// Frames the loops describe (each frame carries every channel).
    pub fn frame_total(&self) -> usize {
        self.time_extent() * self.position_extent() * self.z_extent()
    }

    /// Sequence index of a frame. Time is the outermost loop, z the innermost.
    pub fn seq_index(&self, t: usize, position: usize, z: usize) -> usize {
        (t * self.position_extent() + position) * self.z_extent() + z
    }
}

/// Physical stage coordinate of one position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StagePosition {
    pub x: f64,
    pub y: f64,
}

impl StagePosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Address of a single plane in the source's own coordinates.
///
/// Absent loops are addressed with index 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativePlane {
    pub t: usize,
    pub position: usize,
    pub z: usize,
    pub channel: usize,
}

/// A readable multi-dimensional acquisition.
///
/// Pixel access is lazy: nothing is decoded until `read_plane` is called.
pub trait AcquisitionSource: Send + Sync {
    /// Display name, usually the file name.
    fn name(&self) -> &str;

    /// Channel names in the order the source stores them.
    fn channel_names(&self) -> &[String];

    fn axis_lengths(&self) -> AxisLengths;

    /// Number of frames actually recorded. May be smaller than
    /// `axis_lengths().frame_total()` for an interrupted acquisition.
    fn frame_count(&self) -> usize;

    /// Absolute timestamp (fractional Julian day) of the frame at `seq`.
    fn frame_timestamp(&self, seq: usize) -> Option<f64>;

    /// Stage coordinates in acquisition order, one per position.
    fn stage_positions(&self) -> &[StagePosition];

    /// Configured interval between timepoints, in milliseconds.
    fn period_ms(&self) -> Option<f64>;

    /// (height, width) of every plane.
    fn plane_shape(&self) -> (usize, usize);

    fn read_plane(&self, plane: NativePlane) -> Result<Array2<u16>>;
}
