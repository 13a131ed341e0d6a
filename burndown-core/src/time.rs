//! Time utilities: tracker timestamps and timezone-aware "today".

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::error::{BurndownError, Result};

/// Parse a tracker timestamp like "2025-02-10T14:03:00Z" into UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| BurndownError::malformed(format!("invalid timestamp '{s}': {e}")))
}

/// Parse a plain "YYYY-MM-DD" date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| BurndownError::malformed(format!("invalid date '{s}': {e}")))
}

/// Wall-clock date right now in an IANA tz like "Europe/Bucharest".
pub fn today_in(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| BurndownError::InvalidConfig(format!("invalid timezone: {tz}")))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}

/// Helper: format a date the way the chart payload expects.
pub fn format_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}
