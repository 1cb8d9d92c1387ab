use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::acquisition::{AxisLengths, StagePosition};
use crate::consts::LOOP_DESCRIPTOR_SUFFIX;
use crate::error::{FolderError, Result};

/// Acquisition loops stored next to a SER file as `<stem>.loops.toml`.
///
/// Planes in the SER file are ordered by frame sequence index, and within a
/// frame by channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoopDescriptor {
    pub channels: Vec<String>,
    #[serde(default)]
    pub loops: AxisLengths,
    /// Configured interval between timepoints.
    #[serde(default)]
    pub period_ms: Option<f64>,
    #[serde(default)]
    pub stage_positions: Vec<StagePosition>,
}

impl LoopDescriptor {
    /// Descriptor path belonging to an acquisition file.
    pub fn path_for(acquisition: &Path) -> PathBuf {
        let stem = acquisition
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        acquisition.with_file_name(format!("{stem}.{LOOP_DESCRIPTOR_SUFFIX}"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let descriptor: Self = toml::from_str(&contents).map_err(|e| FolderError::InvalidDescriptor {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if descriptor.channels.is_empty() {
            return Err(FolderError::InvalidDescriptor {
                path: path.to_path_buf(),
                message: "no channels listed".into(),
            });
        }
        Ok(descriptor)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| FolderError::InvalidDescriptor {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}
