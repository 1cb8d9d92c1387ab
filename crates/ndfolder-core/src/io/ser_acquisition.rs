use std::path::Path;

use ndarray::Array2;
use tracing::{debug, warn};

use crate::acquisition::{AcquisitionSource, AxisLengths, NativePlane, StagePosition};
use crate::error::Result;
use crate::experiment::julian::ser_ticks_to_julian_day;

use super::descriptor::LoopDescriptor;
use super::ser::SerReader;

/// A SER plane sequence interpreted through its loop descriptor.
pub struct SerAcquisition {
    name: String,
    reader: SerReader,
    descriptor: LoopDescriptor,
}

impl SerAcquisition {
    /// Open `path` and its `<stem>.loops.toml` descriptor.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = SerReader::open(path)?;
        let descriptor = LoopDescriptor::load(&LoopDescriptor::path_for(path))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let expected = descriptor.loops.frame_total() * descriptor.channels.len();
        if reader.plane_count() != expected {
            warn!(
                file = %name,
                planes = reader.plane_count(),
                expected,
                "Plane count does not match the loop descriptor"
            );
        }

        Ok(Self {
            name,
            reader,
            descriptor,
        })
    }

    pub fn descriptor(&self) -> &LoopDescriptor {
        &self.descriptor
    }

    fn plane_index(&self, seq: usize, channel: usize) -> usize {
        seq * self.descriptor.channels.len() + channel
    }
}

impl AcquisitionSource for SerAcquisition {
    fn name(&self) -> &str {
        &self.name
    }

    fn channel_names(&self) -> &[String] {
        &self.descriptor.channels
    }

    fn axis_lengths(&self) -> AxisLengths {
        self.descriptor.loops
    }

    fn frame_count(&self) -> usize {
        self.reader.plane_count() / self.descriptor.channels.len()
    }

    /// Time of the frame's first channel.
    fn frame_timestamp(&self, seq: usize) -> Option<f64> {
        self.reader
            .plane_ticks(self.plane_index(seq, 0))
            .map(ser_ticks_to_julian_day)
    }

    fn stage_positions(&self) -> &[StagePosition] {
        &self.descriptor.stage_positions
    }

    fn period_ms(&self) -> Option<f64> {
        self.descriptor.period_ms
    }

    fn plane_shape(&self) -> (usize, usize) {
        (
            self.reader.header.height as usize,
            self.reader.header.width as usize,
        )
    }

    /// Planes the acquisition never recorded read as zeros.
    fn read_plane(&self, plane: NativePlane) -> Result<Array2<u16>> {
        let seq = self
            .descriptor
            .loops
            .seq_index(plane.t, plane.position, plane.z);
        let index = self.plane_index(seq, plane.channel);
        if index >= self.reader.plane_count() {
            debug!(file = %self.name, index, "Plane not recorded, reading zeros");
            return Ok(Array2::zeros(self.plane_shape()));
        }
        self.reader.read_plane(index)
    }
}
