//! Coordinate reconciliation and time alignment.

pub mod coords;
pub mod grid;
pub mod probe;
pub mod timestamps;

pub use coords::{AxisPadding, CoordinateLayout, FrameCoord, FrameSlot, LoopAxis};
pub use grid::{resolve_grid, GridConfig, GridLayout};
pub use probe::{probe, CanonicalShape};
pub use timestamps::{
    correct_duplicate_timestamps, has_duplicate_timestamps, permute_positions,
    reconstruct_timestamps,
};
