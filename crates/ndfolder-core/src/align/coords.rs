use crate::acquisition::AxisLengths;

/// Logical loop of an acquisition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopAxis {
    Time,
    Position,
    Z,
}

/// Native coordinate of one frame. The arity equals the number of loops
/// the source actually recorded, outermost loop first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameCoord {
    Single,
    Coordinate1D(usize),
    Coordinate2D(usize, usize),
    Coordinate3D(usize, usize, usize),
}

/// Which loops a source recorded, resolved once per file from its axis
/// lengths. Loop nesting is time (outer), position, z (inner).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordinateLayout {
    Single,
    Coordinate1D {
        axis: LoopAxis,
        len: usize,
    },
    Coordinate2D {
        outer: (LoopAxis, usize),
        inner: (LoopAxis, usize),
    },
    Coordinate3D {
        time: usize,
        position: usize,
        z: usize,
    },
}

/// Cells of a (time, position, z) tensor addressed by one frame.
/// `None` means the loop is absent and the frame covers the whole axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSlot {
    pub t: Option<usize>,
    pub position: Option<usize>,
    pub z: Option<usize>,
}

impl FrameSlot {
    fn set(&mut self, axis: LoopAxis, index: usize) {
        match axis {
            LoopAxis::Time => self.t = Some(index),
            LoopAxis::Position => self.position = Some(index),
            LoopAxis::Z => self.z = Some(index),
        }
    }
}

impl CoordinateLayout {
    pub fn from_axis_lengths(lengths: &AxisLengths) -> Self {
        let present: Vec<(LoopAxis, usize)> = [
            (LoopAxis::Time, lengths.time),
            (LoopAxis::Position, lengths.position),
            (LoopAxis::Z, lengths.z),
        ]
        .into_iter()
        .filter(|&(_, len)| len > 0)
        .collect();

        match present.as_slice() {
            [] => Self::Single,
            [(axis, len)] => Self::Coordinate1D {
                axis: *axis,
                len: *len,
            },
            [outer, inner] => Self::Coordinate2D {
                outer: *outer,
                inner: *inner,
            },
            _ => Self::Coordinate3D {
                time: lengths.time,
                position: lengths.position,
                z: lengths.z,
            },
        }
    }

    /// Number of frames the layout addresses.
    pub fn frame_total(&self) -> usize {
        match *self {
            Self::Single => 1,
            Self::Coordinate1D { len, .. } => len,
            Self::Coordinate2D { outer, inner } => outer.1 * inner.1,
            Self::Coordinate3D { time, position, z } => time * position * z,
        }
    }

    /// Translate a linear sequence index into the native coordinate.
    pub fn coords_from_seq_index(&self, seq: usize) -> Option<FrameCoord> {
        if seq >= self.frame_total() {
            return None;
        }
        let coord = match *self {
            Self::Single => FrameCoord::Single,
            Self::Coordinate1D { .. } => FrameCoord::Coordinate1D(seq),
            Self::Coordinate2D { inner, .. } => FrameCoord::Coordinate2D(seq / inner.1, seq % inner.1),
            Self::Coordinate3D { position, z, .. } => {
                FrameCoord::Coordinate3D(seq / (position * z), (seq / z) % position, seq % z)
            }
        };
        Some(coord)
    }

    /// Tensor cells covered by the frame at `seq`.
    pub fn locate(&self, seq: usize) -> Option<FrameSlot> {
        let coord = self.coords_from_seq_index(seq)?;
        let mut slot = FrameSlot::default();
        match (self, coord) {
            (Self::Single, FrameCoord::Single) => {}
            (Self::Coordinate1D { axis, .. }, FrameCoord::Coordinate1D(i)) => slot.set(*axis, i),
            (Self::Coordinate2D { outer, inner }, FrameCoord::Coordinate2D(i, j)) => {
                slot.set(outer.0, i);
                slot.set(inner.0, j);
            }
            (Self::Coordinate3D { .. }, FrameCoord::Coordinate3D(t, p, z)) => {
                slot = FrameSlot {
                    t: Some(t),
                    position: Some(p),
                    z: Some(z),
                };
            }
            _ => return None,
        }
        Some(slot)
    }
}

/// Placement of a short native axis inside a longer canonical one.
///
/// Real planes sit in the middle; when the padding is odd the trailing side
/// receives the extra plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisPadding {
    pub leading: usize,
    pub native: usize,
    pub total: usize,
}

impl AxisPadding {
    pub fn centered(native: usize, total: usize) -> Self {
        let native = native.min(total);
        Self {
            leading: (total - native) / 2,
            native,
            total,
        }
    }

    pub fn trailing(&self) -> usize {
        self.total - self.leading - self.native
    }

    /// Native index stored at canonical index `i`, if any.
    pub fn native_index(&self, i: usize) -> Option<usize> {
        if i >= self.leading && i < self.leading + self.native {
            Some(i - self.leading)
        } else {
            None
        }
    }

    /// Canonical index of native index `i`.
    pub fn canonical_index(&self, i: usize) -> Option<usize> {
        (i < self.native).then_some(self.leading + i)
    }
}
