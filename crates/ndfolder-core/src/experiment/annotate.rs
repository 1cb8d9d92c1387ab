use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use ndarray::Array3;

use crate::consts::OVERLAY_TIME_FORMAT;
use crate::error::{FolderError, Result};

use super::info::{channel_label, Antibiotic, ChannelInfo, ExperimentInfo};
use super::julian::julian_day_to_datetime;

/// Currently displayed (time, position, z) indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub t: usize,
    pub position: usize,
    pub z: usize,
}

impl Cursor {
    pub fn new(t: usize, position: usize, z: usize) -> Self {
        Self { t, position, z }
    }
}

/// Time elapsed since a schedule mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Elapsed {
    /// The current timestamp is not known.
    Unknown,
    /// The mark is unset or still in the future.
    NotStarted,
    Since(TimeDelta),
}

impl Elapsed {
    pub fn between(current: Option<NaiveDateTime>, mark: Option<NaiveDateTime>) -> Self {
        match (current, mark) {
            (None, _) => Self::Unknown,
            (Some(current), Some(mark)) if current >= mark => Self::Since(current - mark),
            _ => Self::NotStarted,
        }
    }
}

/// Hours and minutes, e.g. `26h 05m`, with a leading `-` when negative.
pub fn format_duration(delta: TimeDelta) -> String {
    let sign = if delta < TimeDelta::zero() { "-" } else { "" };
    let minutes = delta.abs().num_minutes();
    format!("{sign}{}h {:02}m", minutes / 60, minutes % 60)
}

fn format_time(time: Option<NaiveDateTime>) -> String {
    time.map(|t| t.format(OVERLAY_TIME_FORMAT).to_string())
        .unwrap_or_else(|| "not set".to_string())
}

/// Everything the overlay shows for one cursor.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub position_label: String,
    pub antibiotic: Option<Antibiotic>,
    pub total_exposure: Option<TimeDelta>,
    pub antibiotic_elapsed: Elapsed,
    pub regrowth_elapsed: Elapsed,
    pub current_time: Option<NaiveDateTime>,
    pub antibiotic_start: Option<NaiveDateTime>,
    pub antibiotic_end: Option<NaiveDateTime>,
}

impl Annotation {
    pub fn compute(position_label: &str, current_time: Option<NaiveDateTime>, channel: &ChannelInfo) -> Self {
        Self {
            position_label: position_label.to_string(),
            antibiotic: channel.antibiotic.clone(),
            total_exposure: channel.antibiotic_exposure(),
            antibiotic_elapsed: Elapsed::between(current_time, channel.antibiotic_start),
            regrowth_elapsed: Elapsed::between(current_time, channel.antibiotic_end),
            current_time,
            antibiotic_start: channel.antibiotic_start,
            antibiotic_end: channel.antibiotic_end,
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.total_exposure {
            Some(total) => writeln!(
                f,
                "{} had {} of abx duration",
                self.position_label,
                format_duration(total)
            )?,
            None => writeln!(f, "{} had no abx duration yet", self.position_label)?,
        }

        if let Some(ref abx) = self.antibiotic {
            writeln!(
                f,
                "{} ({:2.0} {})",
                abx.name, abx.concentration, abx.concentration_unit
            )?;
        }

        match self.antibiotic_elapsed {
            Elapsed::Since(d) => writeln!(f, "Current abx time:           {}", format_duration(d))?,
            Elapsed::NotStarted => writeln!(f, "abx not started yet")?,
            Elapsed::Unknown => writeln!(f, "Current abx time:           unknown")?,
        }

        match self.regrowth_elapsed {
            Elapsed::Since(d) => writeln!(f, "Current regrowth time: {}", format_duration(d))?,
            Elapsed::NotStarted => writeln!(f, "regrowth not started yet")?,
            Elapsed::Unknown => writeln!(f, "Current regrowth time: unknown")?,
        }

        match self.current_time {
            Some(t) => writeln!(f, "Current time: {}", t.format(OVERLAY_TIME_FORMAT))?,
            None => writeln!(f, "Current time: unknown")?,
        }

        writeln!(f, "Start time:      {}", format_time(self.antibiotic_start))?;
        write!(f, "End time:        {}", format_time(self.antibiotic_end))
    }
}

/// Build the overlay text for `cursor`.
///
/// `labels` holds one label per position of the timestamp tensor. Channels
/// missing from `experiment` read as an empty schedule.
pub fn annotate(
    cursor: Cursor,
    times: &Array3<f64>,
    labels: &[String],
    experiment: &ExperimentInfo,
) -> Result<Annotation> {
    let timestamp = times
        .get((cursor.t, cursor.position, cursor.z))
        .copied()
        .ok_or_else(|| FolderError::CursorOutOfRange {
            t: cursor.t,
            position: cursor.position,
            z: cursor.z,
            shape: times.dim(),
        })?;

    let fallback = format!("position{}", cursor.position + 1);
    let label = labels.get(cursor.position).unwrap_or(&fallback);
    let empty = ChannelInfo::default();
    let channel = experiment.channel(channel_label(label)).unwrap_or(&empty);

    Ok(Annotation::compute(
        label,
        julian_day_to_datetime(timestamp),
        channel,
    ))
}
