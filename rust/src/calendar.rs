//! Linear calendar helpers.
//!
//! CPM arithmetic runs in fractional day offsets from 0. Storage keeps lags in
//! minutes at a fixed minutes-per-day ratio, and display needs calendar dates
//! relative to the project anchor. Neither conversion knows about weekends or
//! holidays.

use chrono::{Duration, NaiveDate};

use crate::errors::ValidationError;

/// Eight working hours per day.
pub const DEFAULT_MINUTES_PER_DAY: f64 = 480.0;

/// Convert a stored minute count into days.
pub fn minutes_to_days(minutes: f64, minutes_per_day: f64) -> Result<f64, ValidationError> {
    if !minutes_per_day.is_finite() || minutes_per_day <= 0.0 {
        return Err(ValidationError::InvalidMinutesPerDay(minutes_per_day));
    }
    Ok(minutes / minutes_per_day)
}

/// Calendar date of a day offset. Fractional offsets fall on the day they start in.
pub fn project_date(anchor: NaiveDate, offset_days: f64) -> NaiveDate {
    shift(anchor, offset_days.floor())
}

/// Calendar date on which work ending at `finish` completes.
///
/// A task finishing at offset 5.0 occupies days 0..=4, so its last working
/// day is anchor + 4. Zero-length spans finish on their start date.
pub fn finish_date(anchor: NaiveDate, start: f64, finish: f64, epsilon: f64) -> NaiveDate {
    if finish - start <= epsilon {
        return project_date(anchor, start);
    }
    let last_day = (finish - epsilon).ceil() - 1.0;
    shift(anchor, last_day.max(start.floor()))
}

fn shift(anchor: NaiveDate, days: f64) -> NaiveDate {
    let whole = days as i64;
    match Duration::try_days(whole).and_then(|delta| anchor.checked_add_signed(delta)) {
        Some(date) => date,
        None if whole < 0 => NaiveDate::MIN,
        None => NaiveDate::MAX,
    }
}
