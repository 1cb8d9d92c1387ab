use std::collections::BTreeMap;
use std::path::Path;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::{FolderError, Result};

/// Antibiotic applied to one chip channel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Antibiotic {
    pub name: String,
    pub concentration: f64,
    pub concentration_unit: String,
}

/// Schedule of one chip channel. Times are local date-times written as
/// strings, e.g. `"2024-03-01T14:30:00"`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    #[serde(default)]
    pub antibiotic: Option<Antibiotic>,
    #[serde(default)]
    pub antibiotic_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub antibiotic_end: Option<NaiveDateTime>,
}

impl ChannelInfo {
    /// Total exposure, known once both start and end are set.
    pub fn antibiotic_exposure(&self) -> Option<TimeDelta> {
        match (self.antibiotic_start, self.antibiotic_end) {
            (Some(start), Some(end)) => Some(end - start),
            _ => None,
        }
    }
}

/// Experiment description stored next to the acquisitions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentInfo {
    /// Stage x axis runs opposite to the chip's lane order.
    #[serde(default)]
    pub invert_x: bool,
    /// Stage y axis runs opposite to the chip's row order.
    #[serde(default)]
    pub invert_y: bool,
    /// Keyed by the chip channel label, the part of a position label before
    /// the first `-`.
    #[serde(default)]
    pub channel_infos: BTreeMap<String, ChannelInfo>,
}

impl ExperimentInfo {
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| FolderError::InvalidExperiment(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn channel(&self, label: &str) -> Option<&ChannelInfo> {
        self.channel_infos.get(label)
    }
}

/// Chip channel label of a position label (`lane2-3` -> `lane2`).
pub fn channel_label(position_label: &str) -> &str {
    position_label.split('-').next().unwrap_or(position_label)
}
