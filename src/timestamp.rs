//! Parsing and display of attendance log timestamps.
//!
//! The log is written by more than one tool, so timestamps show up as RFC 3339
//! strings, ISO strings without seconds (`2024-01-01T10:00Z`) and naive
//! `YYYY-MM-DD HH:MM:SS` strings. Naive timestamps are taken to be UTC.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::{BorrowedFormatItem, well_known::Rfc3339},
    macros::format_description,
};
use time_tz::{Offset, TimeZone, Tz};

const NAIVE_FORMATS: &[&[BorrowedFormatItem<'static>]] = &[
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
    format_description!("[year]-[month]-[day] [hour]:[minute]"),
    format_description!("[year]-[month]-[day]T[hour]:[minute]"),
];

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

const LOG_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

// Matches `Date.prototype.toLocaleString('en-US')`, e.g. "1/1/2024, 10:00:00 AM".
const DISPLAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[month padding:none]/[day padding:none]/[year], [hour repr:12 padding:none]:[minute]:[second] [period]"
);

/// Look up a canonical timezone name, e.g. "Pacific/Auckland".
pub fn get_timezone(canonical_timezone: &str) -> Option<&'static Tz> {
    time_tz::timezones::get_by_name(canonical_timezone)
}

/// The UTC offset `timezone` had at `timestamp`.
///
/// Each timestamp gets its own offset so that daylight saving changes
/// between two records, or since the server started, are respected.
pub fn offset_at(timezone: &Tz, timestamp: OffsetDateTime) -> UtcOffset {
    timezone.get_offset_utc(&timestamp).to_utc()
}

/// Parse a timestamp from the attendance log.
///
/// Returns `None` if `text` is not in any of the accepted formats.
pub fn parse_timestamp(text: &str) -> Option<OffsetDateTime> {
    let text = text.trim();

    if let Ok(timestamp) = OffsetDateTime::parse(text, &Rfc3339) {
        return Some(timestamp);
    }

    let naive = text.strip_suffix('Z').unwrap_or(text);

    NAIVE_FORMATS
        .iter()
        .find_map(|format| PrimitiveDateTime::parse(naive, format).ok())
        .or_else(|| {
            Date::parse(naive, DATE_FORMAT)
                .ok()
                .map(|date| date.midnight())
        })
        .map(PrimitiveDateTime::assume_utc)
}

/// Format a timestamp the way the attendance API returns it, `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn format_log_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .to_offset(UtcOffset::UTC)
        .format(LOG_FORMAT)
        .unwrap_or_else(|error| {
            tracing::error!("could not format log timestamp {timestamp}: {error}");
            timestamp.to_string()
        })
}

/// Format a timestamp for display in the attendance table, in `local_offset` time.
pub fn format_display_timestamp(timestamp: OffsetDateTime, local_offset: UtcOffset) -> String {
    timestamp
        .to_offset(local_offset)
        .format(DISPLAY_FORMAT)
        .unwrap_or_else(|error| {
            tracing::error!("could not format display timestamp {timestamp}: {error}");
            timestamp.to_string()
        })
}

/// The calendar day of `timestamp` in `local_offset` time, as `YYYY-MM-DD`.
pub fn date_key(timestamp: OffsetDateTime, local_offset: UtcOffset) -> String {
    let date = timestamp.to_offset(local_offset).date();

    date.format(DATE_FORMAT).unwrap_or_else(|error| {
        tracing::error!("could not format date {date}: {error}");
        date.to_string()
    })
}
