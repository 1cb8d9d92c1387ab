use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid loop descriptor {path}: {message}")]
    InvalidDescriptor { path: PathBuf, message: String },

    #[error("Invalid experiment info: {0}")]
    InvalidExperiment(String),

    #[error("Invalid position labels {path}: {message}")]
    InvalidLabels { path: PathBuf, message: String },

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("Plane (t={t}, position={position}, z={z}, channel={channel}) out of range for stack {shape}")]
    PlaneOutOfRange {
        t: usize,
        position: usize,
        z: usize,
        channel: usize,
        shape: String,
    },

    #[error("Plane shape {actual:?} does not match stack geometry {expected:?}")]
    PlaneShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Stacks cannot be concatenated: {0}")]
    IncompatibleStacks(String),

    #[error("No acquisition files found in {0}")]
    EmptyFolder(PathBuf),

    #[error("Grid resolution failed: {0}")]
    GridResolution(String),

    #[error("Cursor (t={t}, position={position}, z={z}) outside timestamp tensor {shape:?}")]
    CursorOutOfRange {
        t: usize,
        position: usize,
        z: usize,
        shape: (usize, usize, usize),
    },

    #[error("Image format error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, FolderError>;
