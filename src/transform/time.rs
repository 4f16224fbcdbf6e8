use super::error::EventError;
use crate::warehouse::TimeRecord;
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Text form of the `start_time` key: UTC with millisecond precision.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Derive the time dimension row of an event timestamp in epoch milliseconds.
///
/// All fields are taken in UTC. `week` is the ISO-8601 week number while
/// `year` stays the calendar year, and `weekday` counts Monday = 0.
pub fn derive_time_record(ts_millis: i64) -> Result<TimeRecord, EventError> {
    let at: DateTime<Utc> = DateTime::from_timestamp_millis(ts_millis)
        .ok_or(EventError::TimestampOutOfRange(ts_millis))?;

    Ok(TimeRecord {
        start_time: at.format(START_TIME_FORMAT).to_string(),
        hour: at.hour(),
        day: at.day(),
        week: at.iso_week().week(),
        month: at.month(),
        year: at.year(),
        weekday: at.weekday().num_days_from_monday(),
    })
}
