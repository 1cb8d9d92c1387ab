pub mod config;
mod loader;
mod types;

pub use loader::{assemble, discover_acquisitions, load_folder, load_folder_reported};
pub use types::{LoadStage, LoadedFolder, ProgressReporter};
