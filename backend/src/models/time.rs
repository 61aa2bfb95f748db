//! Clock-time codec.
//!
//! Spreadsheet cells carry loosely formatted times such as `"2:30 PM"` or
//! `"11:05"`. They are stored as a military-time-like integer
//! (`hour * 100 + minute`, so 2:30 PM is `1430`), which is *not* a count of
//! minutes. Parsing never fails: malformed text degrades to `0`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical military-time integer (`hour * 100 + minute`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MilitaryTime(i32);

/// Values at or above this cutoff are labelled PM in display form.
const PM_CUTOFF: i32 = 1300;

/// Largest clock components accepted by [`MilitaryTime::parse`].
const MAX_HOUR: u32 = 23;
const MAX_MINUTE: u32 = 59;

impl MilitaryTime {
    /// Fallback value for text that could not be parsed.
    pub const ZERO: MilitaryTime = MilitaryTime(0);

    /// Wrap an already-canonical integer.
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    /// Build from an hour (0-23) and minute pair.
    pub fn from_hm(hour: i32, minute: i32) -> Self {
        Self(hour * 100 + minute)
    }

    /// Parse free text into the canonical integer.
    ///
    /// The text is split on a single `:`; a case-insensitive `PM` marker adds
    /// 12 to any hour other than 12. Only the first two characters of the
    /// minute token are considered. Anything unparsable, or any hour past 23
    /// or minute past 59 after the PM shift, yields [`Self::ZERO`].
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split(':');
        let (Some(hour_token), Some(minute_token), None) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Self::ZERO;
        };

        let Ok(mut hour) = hour_token.trim().parse::<u32>() else {
            return Self::ZERO;
        };

        let minute_digits: String = minute_token.trim_start().chars().take(2).collect();
        let Ok(minute) = minute_digits.trim().parse::<u32>() else {
            return Self::ZERO;
        };

        if text.to_ascii_lowercase().contains("pm") && hour != 12 {
            hour = hour.saturating_add(12);
        }

        if hour > MAX_HOUR || minute > MAX_MINUTE {
            return Self::ZERO;
        }
        Self::from_hm(hour as i32, minute as i32)
    }

    /// Raw canonical integer.
    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn hour(&self) -> i32 {
        self.0 / 100
    }

    pub fn minute(&self) -> i32 {
        self.0 % 100
    }

    /// Hour on a 12-hour clock (`0` maps to `12`).
    pub fn hour12(&self) -> i32 {
        match self.hour() % 12 {
            0 => 12,
            h => h,
        }
    }

    pub fn meridiem(&self) -> Meridiem {
        if self.0 >= PM_CUTOFF {
            Meridiem::Pm
        } else {
            Meridiem::Am
        }
    }

    /// True minutes since midnight, used for elapsed-time arithmetic.
    pub fn minutes_since_midnight(&self) -> i32 {
        self.hour() * 60 + self.minute()
    }

    /// Decomposed display form.
    pub fn display(&self) -> DisplayTime {
        DisplayTime {
            hour: self.hour(),
            minute: self.minute(),
            hour12: self.hour12(),
            meridiem: self.meridiem(),
        }
    }
}

impl fmt::Display for MilitaryTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<i32> for MilitaryTime {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// AM/PM label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Meridiem {
    Am,
    Pm,
}

impl fmt::Display for Meridiem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Meridiem::Am => f.write_str("AM"),
            Meridiem::Pm => f.write_str("PM"),
        }
    }
}

/// Display components of a [`MilitaryTime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayTime {
    pub hour: i32,
    pub minute: i32,
    pub hour12: i32,
    pub meridiem: Meridiem,
}

impl fmt::Display for DisplayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02} {}", self.hour12, self.minute, self.meridiem)
    }
}

/// Human-readable duration between two canonical times, e.g. `"1 hr 15 min"`.
///
/// Negative spans render as `"0 min"`.
pub fn elapsed_display(start: MilitaryTime, end: MilitaryTime) -> String {
    let total = (end.minutes_since_midnight() - start.minutes_since_midnight()).max(0);
    let (hours, minutes) = (total / 60, total % 60);
    match (hours, minutes) {
        (0, m) => format!("{} min", m),
        (h, 0) => format!("{} hr", h),
        (h, m) => format!("{} hr {} min", h, m),
    }
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod time_tests;
