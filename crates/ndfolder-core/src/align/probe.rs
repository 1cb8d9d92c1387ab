use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::acquisition::AcquisitionSource;
use crate::error::{FolderError, Result};

/// Folder-wide target shape shared by every normalized stack.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CanonicalShape {
    /// Longest time extent of any file (files are concatenated, so this is
    /// informational only).
    pub time_len: usize,
    pub position_len: usize,
    pub z_len: usize,
    pub channel_names: Vec<String>,
    pub height: usize,
    pub width: usize,
}

impl CanonicalShape {
    pub fn channel_count(&self) -> usize {
        self.channel_names.len()
    }

    /// Size of one decoded plane in bytes.
    pub fn plane_bytes(&self) -> usize {
        self.height * self.width * std::mem::size_of::<u16>()
    }
}

/// Determine the canonical extents of a set of acquisitions.
///
/// z and time take the maximum over all files. Channel names, position count
/// and frame geometry come from the representative file: the first one
/// reporting the largest number of channels.
pub fn probe(sources: &[Arc<dyn AcquisitionSource>]) -> Result<CanonicalShape> {
    let mut representative: Option<&Arc<dyn AcquisitionSource>> = None;
    for source in sources {
        let better = match representative {
            Some(current) => source.channel_names().len() > current.channel_names().len(),
            None => true,
        };
        if better {
            representative = Some(source);
        }
    }
    let representative = representative.ok_or(FolderError::EmptyFolder(Default::default()))?;

    let z_len = sources
        .iter()
        .map(|s| s.axis_lengths().z_extent())
        .max()
        .unwrap_or(1);
    let time_len = sources
        .iter()
        .map(|s| s.axis_lengths().time_extent())
        .max()
        .unwrap_or(1);

    let position_len = representative.axis_lengths().position_extent();
    for source in sources {
        let own = source.axis_lengths().position_extent();
        if own != position_len {
            warn!(
                file = source.name(),
                positions = own,
                canonical = position_len,
                "Position count differs from representative file"
            );
        }
    }

    let (height, width) = representative.plane_shape();
    let shape = CanonicalShape {
        time_len,
        position_len,
        z_len,
        channel_names: representative.channel_names().to_vec(),
        height,
        width,
    };
    debug!(
        representative = representative.name(),
        z_len = shape.z_len,
        positions = shape.position_len,
        channels = ?shape.channel_names,
        "Canonical shape probed"
    );
    Ok(shape)
}
