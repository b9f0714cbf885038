//! Resolves the configured canonical timezone into concrete dates.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

/// Look up the UTC offset currently in effect for a canonical timezone name,
/// e.g. "Pacific/Auckland".
///
/// Returns [None] if the name is not a known timezone.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in the given canonical timezone.
///
/// Falls back to UTC when the timezone name is unknown so that date
/// validation and month defaults keep working with a misconfigured server.
pub fn local_today(canonical_timezone: &str) -> Date {
    let offset = match get_local_offset(canonical_timezone) {
        Some(offset) => offset,
        None => {
            tracing::warn!("Unknown timezone \"{canonical_timezone}\", falling back to UTC.");
            UtcOffset::UTC
        }
    };

    OffsetDateTime::now_utc().to_offset(offset).date()
}
