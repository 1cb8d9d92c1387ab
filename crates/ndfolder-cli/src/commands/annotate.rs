use anyhow::{Context, Result};
use clap::Args;
use ndfolder_core::experiment::Cursor;

use super::folder::{CursorArgs, FolderArgs};

#[derive(Args)]
pub struct AnnotateArgs {
    #[command(flatten)]
    pub folder: FolderArgs,

    #[command(flatten)]
    pub cursor: CursorArgs,

    /// Print the overlay of every position at the given t and z
    #[arg(long)]
    pub all_positions: bool,
}

pub fn run(args: &AnnotateArgs) -> Result<()> {
    let folder = args.folder.load()?;
    let cursor = args.cursor.cursor();

    if !args.all_positions {
        let text = folder
            .overlay_text(cursor)
            .with_context(|| format!("No overlay for cursor {cursor:?}"))?;
        println!("{text}");
        return Ok(());
    }

    for position in 0..folder.stack.shape().position {
        let cursor = Cursor { position, ..cursor };
        println!("{}", folder.overlay_text(cursor)?);
        println!();
    }
    Ok(())
}
