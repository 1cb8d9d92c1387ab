/// Smallest x distance (stage units) between two positions still counted as
/// neighbouring lanes.
pub const DEFAULT_MIN_LANE_SPACING: f64 = 2000.0;

/// Largest x distance (stage units) between two positions still counted as
/// neighbouring lanes.
pub const DEFAULT_MAX_LANE_SPACING: f64 = 6000.0;

/// Number of lane centres scanned by the grid resolver. Matches the chip
/// geometry of the acquisition device.
pub const DEFAULT_MAX_LANES: usize = 10;

/// A position joins a lane when its x lies within `pitch / divisor` of the
/// lane centre.
pub const DEFAULT_LANE_TOLERANCE_DIVISOR: f64 = 3.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

pub const MILLISECONDS_PER_DAY: f64 = 86_400_000.0;

/// Julian day of 1970-01-01T00:00:00 UTC.
pub const UNIX_EPOCH_JULIAN_DAY: f64 = 2_440_587.5;

/// Julian day of 0001-01-01T00:00:00 UTC, the origin of SER timestamps.
pub const SER_EPOCH_JULIAN_DAY: f64 = 1_721_425.5;

/// SER timestamps count 100 ns ticks.
pub const SER_TICKS_PER_DAY: f64 = 864_000_000_000.0;

/// Default capacity of the realized-plane cache (20 GB).
pub const DEFAULT_CACHE_CAPACITY_BYTES: u64 = 20_000_000_000;

/// File extension of acquisition files picked up from a folder.
pub const DEFAULT_ACQUISITION_EXTENSION: &str = "ser";

/// Suffix of the loop descriptor stored next to each acquisition file.
pub const LOOP_DESCRIPTOR_SUFFIX: &str = "loops.toml";

pub const DEFAULT_EXPERIMENT_FILE: &str = "exp-info.toml";

/// Position label spreadsheet. `.xlsx` and `.csv` are both read.
pub const DEFAULT_POSITIONS_FILE: &str = "positions.xlsx";

/// Opacity of the first channel layer.
pub const PRIMARY_LAYER_OPACITY: f32 = 1.0;

/// Opacity of every channel layer after the first.
pub const OVERLAY_LAYER_OPACITY: f32 = 0.6;

/// strftime pattern of absolute times in the overlay text.
pub const OVERLAY_TIME_FORMAT: &str = "%Y-%m-%d %H-%M";
