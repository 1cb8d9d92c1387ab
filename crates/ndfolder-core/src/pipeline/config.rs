use serde::{Deserialize, Serialize};

use crate::align::GridConfig;
use crate::consts::{
    DEFAULT_ACQUISITION_EXTENSION, DEFAULT_CACHE_CAPACITY_BYTES, DEFAULT_EXPERIMENT_FILE,
    DEFAULT_POSITIONS_FILE,
};

/// Settings for loading a folder of acquisitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Extension (without dot) of the acquisition files to pick up.
    #[serde(default = "default_extension")]
    pub acquisition_extension: String,
    /// Experiment info file name inside the folder.
    #[serde(default = "default_experiment_file")]
    pub experiment_file: String,
    /// Optional position label list inside the folder. When present its
    /// labels replace the stage-grid labels.
    #[serde(default = "default_positions_file")]
    pub positions_file: String,
    /// Byte budget of the realized-plane cache. 0 disables caching.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity_bytes: u64,
    #[serde(default)]
    pub grid: GridConfig,
}

fn default_extension() -> String {
    DEFAULT_ACQUISITION_EXTENSION.to_string()
}
fn default_experiment_file() -> String {
    DEFAULT_EXPERIMENT_FILE.to_string()
}
fn default_positions_file() -> String {
    DEFAULT_POSITIONS_FILE.to_string()
}
fn default_cache_capacity() -> u64 {
    DEFAULT_CACHE_CAPACITY_BYTES
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            acquisition_extension: default_extension(),
            experiment_file: default_experiment_file(),
            positions_file: default_positions_file(),
            cache_capacity_bytes: DEFAULT_CACHE_CAPACITY_BYTES,
            grid: GridConfig::default(),
        }
    }
}
