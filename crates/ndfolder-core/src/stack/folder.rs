use std::sync::Arc;

use ndarray::Array2;

use crate::error::{FolderError, Result};

use super::normalize::{NormalizedStack, PlaneRef, StackShape};

/// Normalized stacks of a folder joined along the time axis, in file order.
#[derive(Clone, Debug)]
pub struct FolderStack {
    stacks: Vec<NormalizedStack>,
    /// First global timepoint of each stack.
    time_offsets: Vec<usize>,
    shape: StackShape,
}

impl FolderStack {
    /// All stacks must agree on every axis except time.
    pub fn concatenate(stacks: Vec<NormalizedStack>) -> Result<Self> {
        let first = stacks
            .first()
            .ok_or_else(|| FolderError::IncompatibleStacks("no stacks to concatenate".into()))?
            .shape();

        let mut time_offsets = Vec::with_capacity(stacks.len());
        let mut time = 0;
        for stack in &stacks {
            let shape = stack.shape();
            let same = StackShape { time: 0, ..shape } == StackShape { time: 0, ..first };
            if !same {
                return Err(FolderError::IncompatibleStacks(format!(
                    "{} has shape {shape}, expected {first}",
                    stack.source().name()
                )));
            }
            time_offsets.push(time);
            time += shape.time;
        }

        Ok(Self {
            stacks,
            time_offsets,
            shape: StackShape { time, ..first },
        })
    }

    pub fn shape(&self) -> StackShape {
        self.shape
    }

    pub fn stacks(&self) -> &[NormalizedStack] {
        &self.stacks
    }

    /// Which stack holds global timepoint `t`, and its local index there.
    pub fn locate_time(&self, t: usize) -> Option<(usize, usize)> {
        if t >= self.shape.time {
            return None;
        }
        let index = self.time_offsets.partition_point(|&offset| offset <= t) - 1;
        Some((index, t - self.time_offsets[index]))
    }

    fn stack_at(&self, t: usize, position: usize, z: usize, channel: usize) -> Result<(&NormalizedStack, usize)> {
        self.locate_time(t)
            .map(|(index, local)| (&self.stacks[index], local))
            .ok_or_else(|| FolderError::PlaneOutOfRange {
                t,
                position,
                z,
                channel,
                shape: self.shape.to_string(),
            })
    }

    pub fn plane_ref(&self, t: usize, position: usize, z: usize, channel: usize) -> Result<PlaneRef> {
        let (stack, local) = self.stack_at(t, position, z, channel)?;
        stack.plane_ref(local, position, z, channel)
    }

    pub fn realize_plane(
        &self,
        t: usize,
        position: usize,
        z: usize,
        channel: usize,
    ) -> Result<Arc<Array2<u16>>> {
        let (stack, local) = self.stack_at(t, position, z, channel)?;
        stack.realize_plane(local, position, z, channel)
    }
}
