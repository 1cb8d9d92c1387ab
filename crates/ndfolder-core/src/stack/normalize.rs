use std::fmt;
use std::sync::Arc;

use ndarray::Array2;
use tracing::debug;

use crate::acquisition::{AcquisitionSource, NativePlane};
use crate::align::{AxisPadding, CanonicalShape};
use crate::error::{FolderError, Result};

use super::cache::{PlaneCache, PlaneKey};
use super::reconcile::{reconcile_channels, ChannelMap};

/// Extents of a 6-D stack, indexed (time, position, z, channel, y, x).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackShape {
    pub time: usize,
    pub position: usize,
    pub z: usize,
    pub channel: usize,
    pub height: usize,
    pub width: usize,
}

impl StackShape {
    pub fn as_array(&self) -> [usize; 6] {
        [
            self.time,
            self.position,
            self.z,
            self.channel,
            self.height,
            self.width,
        ]
    }

    pub fn contains(&self, t: usize, position: usize, z: usize, channel: usize) -> bool {
        t < self.time && position < self.position && z < self.z && channel < self.channel
    }
}

impl fmt::Display for StackShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(t={}, position={}, z={}, channel={}, y={}, x={})",
            self.time, self.position, self.z, self.channel, self.height, self.width
        )
    }
}

/// What a canonical plane resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaneRef {
    Native(NativePlane),
    Zero,
}

/// One acquisition viewed through the canonical 6-D shape.
///
/// Holds only index maps; pixels are decoded on `realize_plane`.
#[derive(Clone)]
pub struct NormalizedStack {
    source_id: usize,
    source: Arc<dyn AcquisitionSource>,
    shape: StackShape,
    channels: ChannelMap,
    z_padding: AxisPadding,
    /// Native position behind each canonical position slot.
    positions: Vec<Option<usize>>,
    cache: Option<Arc<PlaneCache>>,
}

impl NormalizedStack {
    /// Fit `source` into `canonical`.
    ///
    /// An absent time loop becomes a single timepoint. A missing or short z
    /// loop is padded with zero planes so the real planes sit centered.
    /// Channels are reordered by name and missing ones read as zeros.
    pub fn normalize(
        source_id: usize,
        source: Arc<dyn AcquisitionSource>,
        canonical: &CanonicalShape,
        cache: Option<Arc<PlaneCache>>,
    ) -> Self {
        let lengths = source.axis_lengths();
        let channels = reconcile_channels(&canonical.channel_names, source.channel_names());
        let z_padding = AxisPadding::centered(lengths.z_extent(), canonical.z_len);
        let native_positions = lengths.position_extent();
        let positions = (0..canonical.position_len)
            .map(|p| (p < native_positions).then_some(p))
            .collect();

        let shape = StackShape {
            time: lengths.time_extent(),
            position: canonical.position_len,
            z: canonical.z_len,
            channel: canonical.channel_count(),
            height: canonical.height,
            width: canonical.width,
        };
        debug!(
            file = source.name(),
            shape = %shape,
            z_leading = z_padding.leading,
            missing_channels = ?channels.missing(),
            "Normalized stack"
        );

        Self {
            source_id,
            source,
            shape,
            channels,
            z_padding,
            positions,
            cache,
        }
    }

    pub fn shape(&self) -> StackShape {
        self.shape
    }

    pub fn source(&self) -> &Arc<dyn AcquisitionSource> {
        &self.source
    }

    pub fn channel_map(&self) -> &ChannelMap {
        &self.channels
    }

    pub fn z_padding(&self) -> AxisPadding {
        self.z_padding
    }

    /// Reorder positions: canonical slot `i` shows raw position
    /// `permutation[i]`. Slots past the permutation read as zeros.
    pub fn permute_positions(&mut self, permutation: &[usize]) {
        let previous = std::mem::take(&mut self.positions);
        self.positions = (0..self.shape.position)
            .map(|slot| {
                permutation
                    .get(slot)
                    .and_then(|&raw| previous.get(raw).copied().flatten())
            })
            .collect();
    }

    pub fn plane_ref(&self, t: usize, position: usize, z: usize, channel: usize) -> Result<PlaneRef> {
        if !self.shape.contains(t, position, z, channel) {
            return Err(FolderError::PlaneOutOfRange {
                t,
                position,
                z,
                channel,
                shape: self.shape.to_string(),
            });
        }
        Ok(self
            .native_plane(t, position, z, channel)
            .map_or(PlaneRef::Zero, PlaneRef::Native))
    }

    fn native_plane(&self, t: usize, position: usize, z: usize, channel: usize) -> Option<NativePlane> {
        Some(NativePlane {
            t,
            position: self.positions[position]?,
            z: self.z_padding.native_index(z)?,
            channel: self.channels.native(channel)?,
        })
    }

    /// Whether the plane holds acquired data rather than zero fill.
    pub fn is_acquired(&self, t: usize, position: usize, z: usize, channel: usize) -> bool {
        matches!(self.plane_ref(t, position, z, channel), Ok(PlaneRef::Native(_)))
    }

    /// Decode one (y, x) plane, going through the cache when present.
    pub fn realize_plane(
        &self,
        t: usize,
        position: usize,
        z: usize,
        channel: usize,
    ) -> Result<Arc<Array2<u16>>> {
        let expected = (self.shape.height, self.shape.width);
        let plane = match self.plane_ref(t, position, z, channel)? {
            PlaneRef::Zero => return Ok(Arc::new(Array2::zeros(expected))),
            PlaneRef::Native(plane) => plane,
        };

        let load = || {
            let data = self.source.read_plane(plane)?;
            if data.dim() != expected {
                return Err(FolderError::PlaneShapeMismatch {
                    expected,
                    actual: data.dim(),
                });
            }
            Ok(data)
        };
        match &self.cache {
            Some(cache) => cache.get_or_load(
                PlaneKey {
                    source: self.source_id,
                    plane,
                },
                load,
            ),
            None => Ok(Arc::new(load()?)),
        }
    }
}

impl fmt::Debug for NormalizedStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedStack")
            .field("source", &self.source.name())
            .field("shape", &self.shape)
            .field("channels", &self.channels)
            .field("z_padding", &self.z_padding)
            .field("positions", &self.positions)
            .finish()
    }
}
