pub mod annotate;
pub mod info;
pub mod julian;

pub use annotate::{annotate, format_duration, Annotation, Cursor, Elapsed};
pub use info::{channel_label, Antibiotic, ChannelInfo, ExperimentInfo};
pub use julian::{datetime_to_julian_day, julian_day_to_datetime, ser_ticks_to_julian_day};
