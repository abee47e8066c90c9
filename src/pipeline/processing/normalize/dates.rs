use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::constants::is_missing_cell;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d %B %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a single-day date from any of the layouts the sources use.
///
/// Returns `None` for missing-value sentinels (`None`, `NA`, empty) and for
/// text in no known layout. Ingestion tells the two apart before calling.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if is_missing_cell(s) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc().date());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Shift a 1-based month forward, wrapping into 1..=12.
pub fn month_ahead(month: u32, months_ahead: u32) -> u32 {
    (month.saturating_sub(1) + months_ahead) % 12 + 1
}
