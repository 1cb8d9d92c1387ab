use chrono::{DateTime, NaiveDateTime};

use crate::consts::{MILLISECONDS_PER_DAY, SER_EPOCH_JULIAN_DAY, SER_TICKS_PER_DAY, UNIX_EPOCH_JULIAN_DAY};

/// Convert a fractional Julian day to a UTC date-time, to millisecond
/// precision. A zero (unknown) timestamp yields `None`.
pub fn julian_day_to_datetime(jd: f64) -> Option<NaiveDateTime> {
    if jd == 0.0 || !jd.is_finite() {
        return None;
    }
    let millis = ((jd - UNIX_EPOCH_JULIAN_DAY) * MILLISECONDS_PER_DAY).round() as i64;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

pub fn datetime_to_julian_day(dt: NaiveDateTime) -> f64 {
    dt.and_utc().timestamp_millis() as f64 / MILLISECONDS_PER_DAY + UNIX_EPOCH_JULIAN_DAY
}

/// Convert a SER timestamp (100 ns ticks since 0001-01-01 UTC).
pub fn ser_ticks_to_julian_day(ticks: u64) -> f64 {
    SER_EPOCH_JULIAN_DAY + ticks as f64 / SER_TICKS_PER_DAY
}

pub fn julian_day_to_ser_ticks(jd: f64) -> u64 {
    ((jd - SER_EPOCH_JULIAN_DAY) * SER_TICKS_PER_DAY).round() as u64
}
