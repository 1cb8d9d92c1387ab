use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use ndfolder_core::experiment::Cursor;
use ndfolder_core::pipeline::config::LoadConfig;
use ndfolder_core::pipeline::{load_folder_reported, LoadedFolder};

use crate::progress::BarReporter;

/// Folder to load, shared by every folder command.
#[derive(Args)]
pub struct FolderArgs {
    /// Folder holding the acquisition files
    pub folder: PathBuf,

    /// Load configuration (TOML), see `ndfolder config`
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl FolderArgs {
    pub fn load(&self) -> Result<LoadedFolder> {
        let config = load_config(self.config.as_deref())?;
        let reporter = Arc::new(BarReporter::new()?);
        let result = load_folder_reported(&self.folder, &config, reporter.clone());
        reporter.finish();
        result.with_context(|| format!("Failed to load folder {}", self.folder.display()))
    }
}

/// (time, position, z) indices of the displayed plane.
#[derive(Args)]
pub struct CursorArgs {
    /// Time index (across all files)
    #[arg(short, long, default_value = "0")]
    pub t: usize,

    /// Position index, in grid order
    #[arg(short, long, default_value = "0")]
    pub position: usize,

    /// Z slice index
    #[arg(short, long, default_value = "0")]
    pub z: usize,
}

impl CursorArgs {
    pub fn cursor(&self) -> Cursor {
        Cursor::new(self.t, self.position, self.z)
    }
}

fn load_config(path: Option<&Path>) -> Result<LoadConfig> {
    let Some(path) = path else {
        return Ok(LoadConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Failed to parse config {}", path.display()))
}
