//! Conversions between a user's named timezone and UTC.
//!
//! Clients send wall-clock times without a usable zone; the server reattaches the
//! caller's zone before converting to UTC for storage, and reverses that on read.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimezoneError {
    #[error("unknown timezone '{0}'")]
    InvalidZone(String),

    #[error("local time {local} does not exist in timezone '{zone}'")]
    NonexistentLocalTime { local: NaiveDateTime, zone: String },
}

/// Resolve an IANA zone name such as `Europe/Warsaw`.
pub fn parse_zone(name: &str) -> Result<Tz, TimezoneError> {
    name.parse::<Tz>()
        .map_err(|_| TimezoneError::InvalidZone(name.to_string()))
}

/// Express a UTC instant in the named zone. The instant itself is unchanged.
pub fn to_user_time(t: DateTime<Utc>, zone: &str) -> Result<DateTime<FixedOffset>, TimezoneError> {
    let tz = parse_zone(zone)?;
    Ok(t.with_timezone(&tz).fixed_offset())
}

/// Interpret wall-clock fields as recorded in `zone` and convert the result to UTC.
///
/// This rebuilds the instant from year..nanosecond; it is not an offset shift.
/// An ambiguous local time (clocks going back) resolves to the earlier instant;
/// a local time skipped by a DST gap is rejected.
pub fn to_utc(wall_clock: NaiveDateTime, zone: &str) -> Result<DateTime<Utc>, TimezoneError> {
    let tz = parse_zone(zone)?;
    match tz.from_local_datetime(&wall_clock) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(TimezoneError::NonexistentLocalTime {
            local: wall_clock,
            zone: zone.to_string(),
        }),
    }
}

/// Optional variant of [`to_utc`]: an absent value stays absent and is never converted.
pub fn opt_to_utc(
    wall_clock: Option<NaiveDateTime>,
    zone: &str,
) -> Result<Option<DateTime<Utc>>, TimezoneError> {
    wall_clock.map(|t| to_utc(t, zone)).transpose()
}
