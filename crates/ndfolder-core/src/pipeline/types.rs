use std::path::PathBuf;
use std::sync::Arc;

use ndarray::{Array2, Array3};

use crate::align::CanonicalShape;
use crate::error::Result;
use crate::experiment::{annotate, Annotation, Cursor, ExperimentInfo};
use crate::layers::ChannelLayer;
use crate::stack::{FolderStack, PlaneCache};

/// Folder loading stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadStage {
    Discovering,
    Opening,
    Probing,
    Normalizing,
    Concatenating,
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovering => write!(f, "Discovering files"),
            Self::Opening => write!(f, "Opening acquisitions"),
            Self::Probing => write!(f, "Probing axes"),
            Self::Normalizing => write!(f, "Normalizing stacks"),
            Self::Concatenating => write!(f, "Concatenating"),
        }
    }
}

/// Thread-safe progress reporting for folder loading.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items
    /// in this stage (e.g. file count), if known.
    fn begin_stage(&self, _stage: LoadStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `load_folder` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// A folder assembled into one stack with aligned metadata.
#[derive(Debug)]
pub struct LoadedFolder {
    pub root: PathBuf,
    /// Acquisition names in load order.
    pub files: Vec<String>,
    pub canonical: CanonicalShape,
    pub stack: FolderStack,
    /// (time, position, z) timestamps in fractional Julian days, 0 = unknown.
    pub times: Array3<f64>,
    /// One label per position of the stack.
    pub labels: Vec<String>,
    pub layers: Vec<ChannelLayer>,
    pub experiment: Option<ExperimentInfo>,
    pub cache: Option<Arc<PlaneCache>>,
}

impl LoadedFolder {
    /// Overlay content for the given cursor.
    pub fn annotation(&self, cursor: Cursor) -> Result<Annotation> {
        let fallback = ExperimentInfo::default();
        let experiment = self.experiment.as_ref().unwrap_or(&fallback);
        annotate(cursor, &self.times, &self.labels, experiment)
    }

    /// Overlay text for the given cursor.
    pub fn overlay_text(&self, cursor: Cursor) -> Result<String> {
        Ok(self.annotation(cursor)?.to_string())
    }

    pub fn realize_plane(&self, cursor: Cursor, channel: usize) -> Result<Arc<Array2<u16>>> {
        self.stack
            .realize_plane(cursor.t, cursor.position, cursor.z, channel)
    }
}
