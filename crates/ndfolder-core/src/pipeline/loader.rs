use std::path::{Path, PathBuf};
use std::sync::Arc;

use ndarray::{concatenate, Array3, ArrayView3, Axis};
use tracing::{info, warn};

use crate::acquisition::AcquisitionSource;
use crate::align::{
    correct_duplicate_timestamps, permute_positions, probe, reconstruct_timestamps, resolve_grid,
    GridLayout,
};
use crate::error::{FolderError, Result};
use crate::experiment::ExperimentInfo;
use crate::io::labels::read_position_labels;
use crate::io::SerAcquisition;
use crate::layers::channel_layers;
use crate::stack::{FolderStack, NormalizedStack, PlaneCache};

use super::config::LoadConfig;
use super::types::{LoadStage, LoadedFolder, NoOpReporter, ProgressReporter};

/// Acquisition files in `folder` with the given extension, sorted by name.
pub fn discover_acquisitions(folder: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Load a folder with the default no-op progress reporter.
pub fn load_folder(folder: &Path, config: &LoadConfig) -> Result<LoadedFolder> {
    load_folder_reported(folder, config, Arc::new(NoOpReporter))
}

/// Open every acquisition in `folder` together with the optional experiment
/// info and position label files, then assemble them.
///
/// Any unreadable or malformed file aborts the whole load.
pub fn load_folder_reported(
    folder: &Path,
    config: &LoadConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<LoadedFolder> {
    reporter.begin_stage(LoadStage::Discovering, None);
    let paths = discover_acquisitions(folder, &config.acquisition_extension)?;
    reporter.finish_stage();
    if paths.is_empty() {
        return Err(FolderError::EmptyFolder(folder.to_path_buf()));
    }

    reporter.begin_stage(LoadStage::Opening, Some(paths.len()));
    let mut sources: Vec<Arc<dyn AcquisitionSource>> = Vec::with_capacity(paths.len());
    for (i, path) in paths.iter().enumerate() {
        info!(file = %path.display(), "Opening acquisition");
        sources.push(Arc::new(SerAcquisition::open(path)?));
        reporter.advance(i + 1);
    }
    reporter.finish_stage();

    let experiment_path = folder.join(&config.experiment_file);
    let experiment = if experiment_path.is_file() {
        Some(ExperimentInfo::load(&experiment_path)?)
    } else {
        info!(path = %experiment_path.display(), "No experiment info");
        None
    };

    let positions_path = folder.join(&config.positions_file);
    let position_labels = if positions_path.is_file() {
        Some(read_position_labels(&positions_path)?)
    } else {
        None
    };

    assemble(
        folder,
        sources,
        experiment,
        position_labels,
        config,
        reporter.as_ref(),
    )
}

/// Normalize, align and concatenate already opened acquisitions.
///
/// Positions are reordered by the stage grid unless `position_labels` is
/// given, in which case acquisition order is kept and those labels are used.
pub fn assemble(
    root: &Path,
    sources: Vec<Arc<dyn AcquisitionSource>>,
    experiment: Option<ExperimentInfo>,
    position_labels: Option<Vec<String>>,
    config: &LoadConfig,
    reporter: &dyn ProgressReporter,
) -> Result<LoadedFolder> {
    if sources.is_empty() {
        return Err(FolderError::EmptyFolder(root.to_path_buf()));
    }

    reporter.begin_stage(LoadStage::Probing, None);
    let canonical = probe(&sources)?;
    reporter.finish_stage();
    info!(
        files = sources.len(),
        z_len = canonical.z_len,
        positions = canonical.position_len,
        channels = ?canonical.channel_names,
        "Canonical shape"
    );

    let cache = (config.cache_capacity_bytes > 0)
        .then(|| Arc::new(PlaneCache::new(config.cache_capacity_bytes)));
    let (invert_x, invert_y) = experiment
        .as_ref()
        .map_or((false, false), |e| (e.invert_x, e.invert_y));

    reporter.begin_stage(LoadStage::Normalizing, Some(sources.len()));
    let mut stacks = Vec::with_capacity(sources.len());
    let mut tensors: Vec<Array3<f64>> = Vec::with_capacity(sources.len());
    let mut labels: Option<Vec<String>> = None;

    for (id, source) in sources.iter().enumerate() {
        let lengths = source.axis_lengths();
        let mut stack =
            NormalizedStack::normalize(id, Arc::clone(source), &canonical, cache.clone());
        let raw_times = reconstruct_timestamps(
            source.as_ref(),
            lengths.time_extent(),
            canonical.position_len,
            canonical.z_len,
        );

        let layout = match position_labels {
            Some(ref given) => GridLayout::with_labels(lengths.position_extent(), given),
            None if source.stage_positions().is_empty() => {
                GridLayout::identity(lengths.position_extent())
            }
            None => resolve_grid(source.stage_positions(), invert_x, invert_y, &config.grid)?,
        };

        stack.permute_positions(&layout.permutation);
        let mut times = permute_positions(&raw_times, &layout.permutation);
        if let Some(period_ms) = source.period_ms() {
            correct_duplicate_timestamps(&mut times, period_ms);
        }

        match labels {
            None => labels = Some(layout.labels),
            Some(ref first) if *first != layout.labels => warn!(
                file = source.name(),
                "Position labels differ from the first file, keeping the first"
            ),
            Some(_) => {}
        }

        stacks.push(stack);
        tensors.push(times);
        reporter.advance(id + 1);
    }
    reporter.finish_stage();

    reporter.begin_stage(LoadStage::Concatenating, None);
    let stack = FolderStack::concatenate(stacks)?;
    let views: Vec<ArrayView3<f64>> = tensors.iter().map(|t| t.view()).collect();
    let times = concatenate(Axis(0), &views)?;
    reporter.finish_stage();

    let mut labels = labels.unwrap_or_default();
    labels.truncate(canonical.position_len);
    while labels.len() < canonical.position_len {
        labels.push(format!("position{}", labels.len() + 1));
    }

    info!(shape = %stack.shape(), "Folder assembled");
    Ok(LoadedFolder {
        root: root.to_path_buf(),
        files: sources.iter().map(|s| s.name().to_string()).collect(),
        layers: channel_layers(&canonical.channel_names),
        canonical,
        stack,
        times,
        labels,
        experiment,
        cache,
    })
}
