use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use ndfolder_core::io::image_io::save_plane;
use ndfolder_core::pipeline::LoadedFolder;
use ndfolder_core::stack::PlaneRef;
use tracing::info;

use super::folder::{CursorArgs, FolderArgs};

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub folder: FolderArgs,

    #[command(flatten)]
    pub cursor: CursorArgs,

    /// Channel index or name
    #[arg(long, default_value = "0")]
    pub channel: String,

    /// Output image (.tiff keeps raw 16-bit samples, .png is stretched to 8-bit)
    #[arg(short, long)]
    pub output: PathBuf,
}

fn resolve_channel(folder: &LoadedFolder, channel: &str) -> Result<usize> {
    let names = &folder.canonical.channel_names;
    if let Some(index) = names.iter().position(|n| n == channel) {
        return Ok(index);
    }
    match channel.parse::<usize>() {
        Ok(index) if index < names.len() => Ok(index),
        _ => bail!("Unknown channel '{}', available: {}", channel, names.join(", ")),
    }
}

pub fn run(args: &ExportArgs) -> Result<()> {
    let folder = args.folder.load()?;
    let channel = resolve_channel(&folder, &args.channel)?;
    let cursor = args.cursor.cursor();

    let plane = folder
        .realize_plane(cursor, channel)
        .with_context(|| format!("Failed to realize plane at {cursor:?}"))?;
    save_plane(&plane, &args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    let acquired = folder
        .stack
        .plane_ref(cursor.t, cursor.position, cursor.z, channel)
        .map(|r| matches!(r, PlaneRef::Native(_)))
        .unwrap_or(false);
    info!(?cursor, channel, acquired, "Plane exported");

    println!(
        "Plane (t={}, position={} [{}], z={}, channel={}) saved to {}{}",
        cursor.t,
        cursor.position,
        folder.labels[cursor.position],
        cursor.z,
        folder.canonical.channel_names[channel],
        args.output.display(),
        if acquired { "" } else { " (zero fill)" }
    );
    Ok(())
}
