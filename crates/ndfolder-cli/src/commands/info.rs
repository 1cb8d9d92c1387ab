use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use ndfolder_core::layers::ChannelLayer;
use ndfolder_core::pipeline::LoadedFolder;
use serde::Serialize;

use super::folder::FolderArgs;
use crate::summary::print_folder_summary;

#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub folder: FolderArgs,

    /// Print a machine-readable TOML report instead of the summary
    #[arg(long)]
    pub toml: bool,
}

/// Machine-readable view of a loaded folder.
#[derive(Serialize)]
struct FolderReport<'a> {
    root: &'a PathBuf,
    files: &'a [String],
    /// (t, position, z, channel, y, x)
    shape: [usize; 6],
    labels: &'a [String],
    layers: &'a [ChannelLayer],
}

impl<'a> FolderReport<'a> {
    fn new(folder: &'a LoadedFolder) -> Self {
        Self {
            root: &folder.root,
            files: &folder.files,
            shape: folder.stack.shape().as_array(),
            labels: &folder.labels,
            layers: &folder.layers,
        }
    }
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let folder = args.folder.load()?;

    if args.toml {
        print!("{}", toml::to_string_pretty(&FolderReport::new(&folder))?);
    } else {
        print_folder_summary(&folder);
    }
    Ok(())
}
