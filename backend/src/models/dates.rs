//! Lenient calendar-date parsing for the start/end date columns.

use chrono::{Duration, NaiveDate, NaiveDateTime};

// Two-digit years are tried before four-digit ones; `%Y` would accept "24" as year 24.
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%d-%b-%Y"];

/// Parse a date cell. Accepts ISO dates, US slash dates, ISO datetimes and
/// spreadsheet serial day numbers. Unparsable text yields `None`.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }

    from_serial(text)
}

/// Spreadsheet serial day numbers count from 1899-12-30.
fn from_serial(text: &str) -> Option<NaiveDate> {
    let serial = text.parse::<f64>().ok()?;
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(Duration::days(serial.trunc() as i64))
}
