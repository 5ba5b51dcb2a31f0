use chrono::{DateTime, Duration, NaiveDateTime, SecondsFormat, Utc};

/// Longest look-back window accepted from config (~100 years).
pub const MAX_WINDOW_DAYS: i64 = 36_500;

/// Parse a stored timestamp.
///
/// Accepts RFC3339 (what this crate writes) and the bare SQLite
/// `datetime('now')` format, which carries no offset and is read as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a timestamp for storage.
///
/// Fixed-width millisecond RFC3339 in UTC, so stored values sort correctly
/// as plain text.
pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// A day-count window, clamped to `0..=MAX_WINDOW_DAYS`.
pub fn window_days(days: i64) -> Duration {
    Duration::try_days(days.clamp(0, MAX_WINDOW_DAYS)).unwrap_or_else(Duration::zero)
}

/// Start of a window ending at `now`. Saturates at the earliest
/// representable instant instead of overflowing.
pub fn window_start(now: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    now.checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Trim and collapse every run of whitespace into a single space.
///
/// Example: "  Agro \t  Negócio\n" → "Agro Negócio"
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Treat empty-after-trim strings as absent.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
